//! Administrative route handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::sync_orders;
use crate::state::AppState;

/// Response to a sync request: how many order projections the cache holds
/// after the pass.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub orders_in_cache: u64,
}

/// Rebuild the cache from the database if it is empty; a no-op otherwise.
#[instrument(skip(state))]
pub async fn sync(State(state): State<AppState>) -> Result<Json<SyncResponse>> {
    let orders_in_cache = sync_orders(state.pool(), state.cache()).await?;
    Ok(Json(SyncResponse { orders_in_cache }))
}

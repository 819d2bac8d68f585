//! Order route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orderflow_core::OrderId;

use crate::error::{AppError, Result};
use crate::models::{CachedOrder, OrderRequest};
use crate::services::OrderService;
use crate::state::AppState;

/// Default number of orders returned by the listing.
const DEFAULT_LIST_LIMIT: usize = 10;

/// Response to a successful order placement.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
}

/// Response to a delete request; `deleted` is 0 or 1.
#[derive(Debug, Serialize)]
pub struct DeleteOrderResponse {
    pub deleted: u64,
}

/// Query parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// Place an order.
#[instrument(skip(state, request))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    let service = OrderService::new(state.pool().clone(), state.cache().clone());
    let order_id = service.place_order(&request).await?;
    Ok((StatusCode::CREATED, Json(CreateOrderResponse { order_id })))
}

/// Point lookup of one order, served from the cache only.
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CachedOrder>> {
    let order_id = OrderId::new(id);
    let order = state
        .cache()
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    Ok(Json(order))
}

/// Most recent orders, newest first.
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CachedOrder>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let orders = state.cache().list_recent(limit).await?;
    Ok(Json(orders))
}

/// Delete an order. Unknown ids report `deleted: 0` rather than an error.
#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteOrderResponse>> {
    let service = OrderService::new(state.pool().clone(), state.cache().clone());
    let deleted = service.delete_order(OrderId::new(id)).await?;
    Ok(Json(DeleteOrderResponse { deleted }))
}

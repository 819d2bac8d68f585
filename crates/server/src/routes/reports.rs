//! Report route handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::{ProductSales, ReportService, UserSpending};
use crate::state::AppState;

/// Default number of report rows.
const DEFAULT_REPORT_LIMIT: usize = 10;

/// Query parameters for both reports.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub limit: Option<usize>,
}

/// Users ranked by aggregated spending, highest first.
#[instrument(skip(state))]
pub async fn highest_spending_users(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<UserSpending>>> {
    let service = ReportService::new(state.pool().clone(), state.cache().clone());
    let limit = params.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    Ok(Json(service.highest_spending_users(limit).await?))
}

/// Products ranked by cumulative quantity sold, highest first.
#[instrument(skip(state))]
pub async fn best_selling_products(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<ProductSales>>> {
    let service = ReportService::new(state.pool().clone(), state.cache().clone());
    let limit = params.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    Ok(Json(service.best_selling_products(limit).await?))
}

//! HTTP route handlers for the order service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness (checks both stores)
//!
//! # Orders
//! POST   /orders                        - Place an order
//! GET    /orders?limit=N                - Most recent orders, newest first
//! GET    /orders/{id}                   - One order, from the cache
//! DELETE /orders/{id}                   - Delete an order
//!
//! # Reports (cache-resident aggregates)
//! GET  /reports/highest-spending-users?limit=N
//! GET  /reports/best-selling-products?limit=N
//!
//! # Admin
//! POST /admin/sync                      - Rebuild an empty cache from the
//!                                         database
//! ```
//!
//! Handlers are glue: extraction, one service call, status mapping. The
//! logic lives in [`crate::services`] and [`crate::cache`].

pub mod admin;
pub mod orders;
pub mod reports;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the application router (health endpoints are added in `main`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route(
            "/orders/{id}",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route(
            "/reports/highest-spending-users",
            get(reports::highest_spending_users),
        )
        .route(
            "/reports/best-selling-products",
            get(reports::best_selling_products),
        )
        .route("/admin/sync", post(admin::sync))
}

//! Database operations for the order ledger (`PostgreSQL`).
//!
//! The database is the system of record; the Redis projections in
//! [`crate::cache`] are derived from it and can be rebuilt.
//!
//! ## Tables
//!
//! - `orders` - One row per order (`id BIGSERIAL`, `user_id`,
//!   `total_amount NUMERIC`, `created_at`)
//! - `order_items` - One row per order line (`order_id`, `product_id`,
//!   `quantity DOUBLE PRECISION`, `unit_price NUMERIC`). `unit_price` is the
//!   catalog price at order time, not a live reference.
//! - `products` - The catalog (`id`, `name`, `price NUMERIC`). Owned by the
//!   catalog service; this crate only reads it.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod orders;
pub mod products;

pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors from ledger database operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx. The surrounding transaction, if any, has
    /// been rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

//! Redis cache for order projections.
//!
//! The cache holds derived, rebuildable structures only:
//!
//! - `order:{id}` - Hash per order (`id`, `user_id`, `total_amount`,
//!   `items` as JSON)
//! - `orders:index` - Sorted set of order keys scored by order id, for
//!   "most recent N" retrieval via `ZREVRANGE`
//! - `product:{id}:sold_qty` - Cumulative units-sold counter per product
//!
//! All values cross this boundary as text; reads coerce them through
//! [`coerce`]. Mutations for one logical operation are issued as a single
//! pipeline, which bounds interleaving with concurrent writers but is not
//! atomic with the database commit that precedes it.

use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use thiserror::Error;

use orderflow_core::{OrderId, ProductId};

pub mod coerce;
pub mod orders;

pub use orders::OrderCache;

/// Sorted set indexing every cached order by id.
pub const ORDERS_INDEX_KEY: &str = "orders:index";

/// Scan pattern matching every per-order hash.
pub const ORDER_KEY_PATTERN: &str = "order:*";

/// Scan pattern matching every sold-quantity counter.
pub const SOLD_QTY_KEY_PATTERN: &str = "product:*:sold_qty";

/// Batch size hint passed to `SCAN`.
pub(crate) const SCAN_COUNT: usize = 500;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis command or connection error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The projection could not be encoded for storage.
    #[error("projection encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key of the per-order projection hash.
#[must_use]
pub fn order_key(id: OrderId) -> String {
    format!("order:{id}")
}

/// Key of a product's cumulative sold-quantity counter.
#[must_use]
pub fn sold_qty_key(id: ProductId) -> String {
    format!("product:{id}:sold_qty")
}

/// Parse the product id back out of a sold-quantity counter key.
///
/// Returns `None` for keys that don't match the `product:{id}:sold_qty`
/// shape, so malformed keys picked up by a pattern scan are skipped rather
/// than misattributed.
#[must_use]
pub fn product_id_from_sold_qty_key(key: &str) -> Option<ProductId> {
    let mut parts = key.split(':');
    if parts.next() != Some("product") {
        return None;
    }
    let id = parts.next()?.parse::<i64>().ok()?;
    if parts.next() != Some("sold_qty") || parts.next().is_some() {
        return None;
    }
    Some(ProductId::new(id))
}

/// Open a managed Redis connection.
///
/// The [`ConnectionManager`] reconnects on failure and is a cheap clone,
/// so one handle is shared across all request handlers.
///
/// # Errors
///
/// Returns `redis::RedisError` if the URL is invalid or the initial
/// connection cannot be established.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_secs(2));

    let client = redis::Client::open(redis_url)?;
    client.get_connection_manager_with_config(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key() {
        assert_eq!(order_key(OrderId::new(42)), "order:42");
    }

    #[test]
    fn test_sold_qty_key() {
        assert_eq!(sold_qty_key(ProductId::new(7)), "product:7:sold_qty");
    }

    #[test]
    fn test_product_id_from_sold_qty_key() {
        assert_eq!(
            product_id_from_sold_qty_key("product:7:sold_qty"),
            Some(ProductId::new(7))
        );
        assert_eq!(product_id_from_sold_qty_key("product:abc:sold_qty"), None);
        assert_eq!(product_id_from_sold_qty_key("product:7"), None);
        assert_eq!(product_id_from_sold_qty_key("order:7"), None);
        assert_eq!(product_id_from_sold_qty_key("product:7:sold_qty:extra"), None);
    }
}

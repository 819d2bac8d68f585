//! Order projection reads and writes.
//!
//! This is the only module that talks to Redis. Writers issue all
//! mutations for one logical operation as a single pipeline; readers never
//! fall back to the database - an order missing from the cache is simply
//! absent here.

use std::collections::HashMap;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use orderflow_core::{OrderId, UserId};

use super::{
    CacheError, ORDER_KEY_PATTERN, ORDERS_INDEX_KEY, SCAN_COUNT, SOLD_QTY_KEY_PATTERN, order_key,
    sold_qty_key,
};
use crate::cache::coerce;
use crate::models::{CachedItem, CachedOrder, Order};

/// Handle over the Redis order projections.
///
/// Cheap to clone; every method clones the underlying managed connection.
#[derive(Clone)]
pub struct OrderCache {
    conn: ConnectionManager,
}

impl OrderCache {
    /// Create a new cache handle over a managed connection.
    #[must_use]
    pub const fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Write the full projection for a newly committed order: the hash, its
    /// entry in the sorted index, and one sold-quantity increment per line,
    /// all as a single pipeline.
    ///
    /// The quantity is truncated to an integer for the counter; the exact
    /// value is preserved in the hash's `items` field.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the items cannot be encoded or the pipeline
    /// fails.
    pub async fn store_projection(&self, order: &CachedOrder) -> Result<(), CacheError> {
        let key = order_key(order.id);
        let items_json = serde_json::to_string(&order.items)?;

        let mut pipe = redis::pipe();
        pipe.hset_multiple(
            &key,
            &[
                ("id", order.id.to_string()),
                ("user_id", order.user_id.to_string()),
                ("total_amount", order.total_amount.to_string()),
                ("items", items_json),
            ],
        )
        .ignore();
        pipe.zadd(ORDERS_INDEX_KEY, &key, order.id.as_i64()).ignore();
        for item in &order.items {
            #[allow(clippy::cast_possible_truncation)]
            let sold = item.quantity.trunc() as i64;
            pipe.incr(sold_qty_key(item.product_id), sold).ignore();
        }

        let mut conn = self.conn.clone();
        pipe.exec_async(&mut conn).await?;
        Ok(())
    }

    /// Remove an order's projection: drop it from the sorted index and
    /// delete its hash, as a single pipeline.
    ///
    /// Sold-quantity counters are left untouched: they are cumulative sales
    /// history and do not roll back when an order is deleted.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the pipeline fails.
    pub async fn remove_projection(&self, id: OrderId) -> Result<(), CacheError> {
        let key = order_key(id);

        let mut conn = self.conn.clone();
        redis::pipe()
            .zrem(ORDERS_INDEX_KEY, &key)
            .ignore()
            .del(&key)
            .ignore()
            .exec_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Point lookup of one cached order. Returns `None` if the hash is
    /// absent; never queries the database.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the read fails.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<CachedOrder>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(order_key(id)).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_order(&raw)))
    }

    /// The most recent `limit` orders, newest first, from the sorted index.
    ///
    /// Index entries whose hash is missing (raced with a concurrent delete)
    /// are silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a read fails.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<CachedOrder>, CacheError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit).unwrap_or(isize::MAX).saturating_sub(1);

        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.zrevrange(ORDERS_INDEX_KEY, 0, stop).await?;

        let mut orders = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: HashMap<String, String> = conn.hgetall(&key).await?;
            if raw.is_empty() {
                continue;
            }
            orders.push(decode_order(&raw));
        }
        Ok(orders)
    }

    /// Every cached order hash, in descending-id order, for full-index
    /// aggregation. Empty hashes are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a read fails.
    pub async fn all_order_hashes(&self) -> Result<Vec<HashMap<String, String>>, CacheError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.zrevrange(ORDERS_INDEX_KEY, 0, -1).await?;

        let mut hashes = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: HashMap<String, String> = conn.hgetall(&key).await?;
            if raw.is_empty() {
                continue;
            }
            hashes.push(raw);
        }
        Ok(hashes)
    }

    /// Count the per-order hashes currently in the cache.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the scan fails.
    pub async fn count_order_keys(&self) -> Result<u64, CacheError> {
        let keys = self.scan_keys(ORDER_KEY_PATTERN).await?;
        Ok(keys.len() as u64)
    }

    /// Bulk-write projections for orders loaded from the ledger, as one
    /// pipeline. Only `id`, `user_id`, and `total_amount` are written: the
    /// ledger listing carries no line items, so the `items` field (and the
    /// sold-quantity counters) are not reconstructed by this path.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the pipeline fails.
    pub async fn bulk_load(&self, orders: &[Order]) -> Result<(), CacheError> {
        if orders.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for order in orders {
            let key = order_key(order.id);
            pipe.hset_multiple(
                &key,
                &[
                    ("id", order.id.to_string()),
                    ("user_id", order.user_id.to_string()),
                    ("total_amount", order.total_amount.to_string()),
                ],
            )
            .ignore();
            pipe.zadd(ORDERS_INDEX_KEY, &key, order.id.as_i64()).ignore();
        }

        let mut conn = self.conn.clone();
        pipe.exec_async(&mut conn).await?;
        Ok(())
    }

    /// Every sold-quantity counter as `(key, raw value)` pairs: an
    /// incremental pattern scan for the keys, then one `MGET` for the
    /// values. A value is `None` if the key expired between the two steps.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the scan or fetch fails.
    pub async fn sold_quantity_counters(
        &self,
    ) -> Result<Vec<(String, Option<String>)>, CacheError> {
        let keys = self.scan_keys(SOLD_QTY_KEY_PATTERN).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = conn.mget(&keys).await?;
        Ok(keys.into_iter().zip(values).collect())
    }

    /// Liveness probe.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the server does not answer.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").exec_async(&mut conn).await?;
        Ok(())
    }

    /// Collect all keys matching `pattern` with an incremental `SCAN`.
    ///
    /// The server is free to serve a scan in any number of batches, so this
    /// loops until the returned cursor signals completion.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

/// Decode one projection hash into a [`CachedOrder`].
///
/// Coercion is deterministic: numeric fields tolerate either integer or
/// float renderings and default to zero when absent or malformed; `items`
/// decodes to an empty list on absence or decode failure.
fn decode_order(raw: &HashMap<String, String>) -> CachedOrder {
    let id = raw.get("id").and_then(|s| coerce::to_i64(s)).unwrap_or_default();
    let user_id = raw
        .get("user_id")
        .and_then(|s| coerce::to_i64(s))
        .unwrap_or_default();
    let total_amount = raw
        .get("total_amount")
        .and_then(|s| coerce::to_decimal(s))
        .unwrap_or_default();
    let items = raw.get("items").map(|s| decode_items(s)).unwrap_or_default();

    CachedOrder {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        total_amount,
        items,
    }
}

/// Decode the serialized `items` field, defaulting to empty on failure.
fn decode_items(raw: &str) -> Vec<CachedItem> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use orderflow_core::ProductId;

    use super::*;

    fn hash(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_decode_order_full_hash() {
        let raw = hash(&[
            ("id", "3"),
            ("user_id", "7"),
            ("total_amount", "20.0"),
            ("items", r#"[{"product_id":1,"quantity":2.0,"unit_price":"10.0"}]"#),
        ]);

        let order = decode_order(&raw);
        assert_eq!(order.id, OrderId::new(3));
        assert_eq!(order.user_id, UserId::new(7));
        assert_eq!(order.total_amount, Decimal::from(20));
        assert_eq!(
            order.items,
            vec![CachedItem {
                product_id: ProductId::new(1),
                quantity: 2.0,
                unit_price: Decimal::from(10),
            }]
        );
    }

    #[test]
    fn test_decode_order_tolerates_float_rendered_ids() {
        // A user_id written as "7.0" by another code path still decodes.
        let raw = hash(&[("id", "3"), ("user_id", "7.0"), ("total_amount", "20")]);

        let order = decode_order(&raw);
        assert_eq!(order.user_id, UserId::new(7));
        assert_eq!(order.items, Vec::new());
    }

    #[test]
    fn test_decode_order_defaults_missing_fields_to_zero() {
        let order = decode_order(&hash(&[("id", "3")]));
        assert_eq!(order.id, OrderId::new(3));
        assert_eq!(order.user_id, UserId::new(0));
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_decode_items_garbage_defaults_to_empty() {
        assert!(decode_items("not json").is_empty());
        assert!(decode_items("{}").is_empty());
        assert!(decode_items("").is_empty());
    }
}

//! Order placement and deletion.
//!
//! The database write is the authoritative outcome: it commits (or rolls
//! back) as one transaction before any cache traffic. The cache projection
//! that follows is best-effort - a failure there is logged and swallowed,
//! leaving the order durable but temporarily invisible to cache readers
//! until a resync.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use orderflow_core::{OrderId, ProductId, UserId};

use crate::cache::OrderCache;
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{CachedItem, CachedOrder, ItemRequest, OrderLine, OrderRequest};

/// Errors from placing or deleting an order.
///
/// The four validation variants are surfaced before any store mutation;
/// `Ledger` means the database transaction failed and was rolled back.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Missing user or empty item list.
    #[error("an order requires a user and at least one item")]
    InvalidInput,

    /// A product id that does not parse as an integer.
    #[error("invalid product id: {0}")]
    InvalidProductId(String),

    /// A quantity that is not a number greater than zero.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A product id absent from the catalog.
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    /// The database write failed; the transaction was rolled back.
    #[error(transparent)]
    Ledger(#[from] RepositoryError),
}

/// Order write path over the two stores.
#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    cache: OrderCache,
}

impl OrderService {
    /// Create a new order service over explicit store handles.
    #[must_use]
    pub const fn new(pool: PgPool, cache: OrderCache) -> Self {
        Self { pool, cache }
    }

    /// Validate, price, and persist an order, then project it into the
    /// cache.
    ///
    /// Each line's subtotal is `unit_price * quantity` using the catalog
    /// price captured now; the stored unit price stays fixed even if the
    /// catalog changes later. The caller's idea of a total is never
    /// trusted.
    ///
    /// # Errors
    ///
    /// Validation errors (`InvalidInput`, `InvalidProductId`,
    /// `InvalidQuantity`, `UnknownProduct`) are returned before anything is
    /// written. `Ledger` means the transaction failed and rolled back. A
    /// cache failure after the commit is logged and swallowed - the order
    /// id is still returned.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderId, OrderError> {
        let user_id = coerce_user_id(&request.user_id).ok_or(OrderError::InvalidInput)?;
        let parsed = parse_lines(&request.items)?;

        let product_ids: Vec<ProductId> = parsed.iter().map(|(id, _)| *id).collect();
        let price_map = ProductRepository::new(&self.pool)
            .prices_by_ids(&product_ids)
            .await?;

        let (lines, total_amount) = price_lines(&parsed, &price_map)?;

        let order_id = OrderRepository::new(&self.pool)
            .create(user_id, &lines, total_amount)
            .await?;

        let projection = CachedOrder {
            id: order_id,
            user_id,
            total_amount,
            items: lines
                .iter()
                .map(|line| CachedItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        };
        if let Err(e) = self.cache.store_projection(&projection).await {
            tracing::warn!(
                order_id = %order_id,
                error = %e,
                "cache projection failed after ledger commit; order stands, cache is stale"
            );
        }

        Ok(order_id)
    }

    /// Delete an order by id.
    ///
    /// Returns the number of orders deleted (0 or 1). Deleting an unknown
    /// id is a no-op, not an error, so the operation is idempotent. The
    /// cache projection is removed best-effort after the commit;
    /// sold-quantity counters are intentionally left as-is.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Ledger` if the database delete fails (the
    /// transaction is rolled back).
    pub async fn delete_order(&self, order_id: OrderId) -> Result<u64, OrderError> {
        let repo = OrderRepository::new(&self.pool);
        if repo.find_by_id(order_id).await?.is_none() {
            return Ok(0);
        }

        let deleted = repo.delete(order_id).await?;
        if !deleted {
            // Raced with another eraser between the lookup and the delete.
            return Ok(0);
        }

        if let Err(e) = self.cache.remove_projection(order_id).await {
            tracing::warn!(
                order_id = %order_id,
                error = %e,
                "cache removal failed after ledger delete; projection is stale until resync"
            );
        }

        Ok(1)
    }
}

/// Coerce the raw `user_id` to a positive integer.
fn coerce_user_id(raw: &serde_json::Value) -> Option<UserId> {
    let id = value_as_i64(raw)?;
    (id > 0).then(|| UserId::new(id))
}

/// Parse every raw line. Product ids are validated across all lines
/// first, then quantities, so the error for a malformed id wins over a
/// malformed quantity anywhere in the request.
fn parse_lines(items: &[ItemRequest]) -> Result<Vec<(ProductId, f64)>, OrderError> {
    if items.is_empty() {
        return Err(OrderError::InvalidInput);
    }

    let mut product_ids = Vec::with_capacity(items.len());
    for item in items {
        let product_id = value_as_i64(&item.product_id)
            .map(ProductId::new)
            .ok_or_else(|| OrderError::InvalidProductId(item.product_id.to_string()))?;
        product_ids.push(product_id);
    }

    let mut parsed = Vec::with_capacity(items.len());
    for (item, product_id) in items.iter().zip(product_ids) {
        let quantity = value_as_f64(&item.quantity)
            .filter(|q| q.is_finite() && *q > 0.0)
            .ok_or_else(|| OrderError::InvalidQuantity(item.quantity.to_string()))?;
        parsed.push((product_id, quantity));
    }
    Ok(parsed)
}

/// Price each line from the catalog snapshot and accumulate the order
/// total. Every product must be present in the price map.
fn price_lines(
    parsed: &[(ProductId, f64)],
    price_map: &HashMap<ProductId, Decimal>,
) -> Result<(Vec<OrderLine>, Decimal), OrderError> {
    let mut lines = Vec::with_capacity(parsed.len());
    let mut total_amount = Decimal::ZERO;

    for (product_id, quantity) in parsed {
        let unit_price = *price_map
            .get(product_id)
            .ok_or(OrderError::UnknownProduct(*product_id))?;

        let quantity_dec = Decimal::try_from(*quantity)
            .map_err(|_| OrderError::InvalidQuantity(quantity.to_string()))?;
        total_amount += unit_price * quantity_dec;

        lines.push(OrderLine {
            product_id: *product_id,
            quantity: *quantity,
            unit_price,
        });
    }

    Ok((lines, total_amount))
}

/// Read a JSON value as an integer, accepting integral numbers and
/// integer-formatted strings.
fn value_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 {
                #[allow(clippy::cast_possible_truncation)]
                let id = f as i64;
                Some(id)
            } else {
                None
            }
        }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a JSON value as a float, accepting numbers and numeric strings.
fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(product_id: serde_json::Value, quantity: serde_json::Value) -> ItemRequest {
        ItemRequest {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_coerce_user_id_accepts_number_and_string() {
        assert_eq!(coerce_user_id(&json!(7)), Some(UserId::new(7)));
        assert_eq!(coerce_user_id(&json!("7")), Some(UserId::new(7)));
    }

    #[test]
    fn test_coerce_user_id_rejects_falsy() {
        assert_eq!(coerce_user_id(&json!(null)), None);
        assert_eq!(coerce_user_id(&json!(0)), None);
        assert_eq!(coerce_user_id(&json!(-1)), None);
        assert_eq!(coerce_user_id(&json!("")), None);
    }

    #[test]
    fn test_parse_lines_empty_is_invalid_input() {
        assert!(matches!(parse_lines(&[]), Err(OrderError::InvalidInput)));
    }

    #[test]
    fn test_parse_lines_bad_product_id() {
        let items = vec![item(json!("abc"), json!(2))];
        assert!(matches!(
            parse_lines(&items),
            Err(OrderError::InvalidProductId(_))
        ));
    }

    #[test]
    fn test_parse_lines_zero_quantity_is_invalid() {
        // Zero is rejected, not just negatives.
        let items = vec![item(json!(1), json!(0))];
        assert!(matches!(
            parse_lines(&items),
            Err(OrderError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_parse_lines_negative_quantity_is_invalid() {
        let items = vec![item(json!(1), json!(-2))];
        assert!(matches!(
            parse_lines(&items),
            Err(OrderError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_parse_lines_accepts_string_fields() {
        let items = vec![item(json!("3"), json!("2.5"))];
        let parsed = parse_lines(&items).unwrap();
        assert_eq!(parsed, vec![(ProductId::new(3), 2.5)]);
    }

    #[test]
    fn test_parse_lines_product_id_checked_before_quantity() {
        // A bad id on the second line beats a bad quantity on the first.
        let items = vec![item(json!(1), json!(0)), item(json!("abc"), json!(2))];
        assert!(matches!(
            parse_lines(&items),
            Err(OrderError::InvalidProductId(_))
        ));
    }

    #[test]
    fn test_price_lines_unknown_product() {
        let parsed = vec![(ProductId::new(9), 1.0)];
        let prices = HashMap::new();
        assert!(matches!(
            price_lines(&parsed, &prices),
            Err(OrderError::UnknownProduct(id)) if id == ProductId::new(9)
        ));
    }

    #[test]
    fn test_price_lines_total_is_sum_of_subtotals() {
        let parsed = vec![(ProductId::new(1), 2.0), (ProductId::new(2), 3.0)];
        let prices = HashMap::from([
            (ProductId::new(1), Decimal::new(100, 1)), // 10.0
            (ProductId::new(2), Decimal::new(55, 1)),  // 5.5
        ]);

        let (lines, total) = price_lines(&parsed, &prices).unwrap();
        assert_eq!(total, Decimal::new(365, 1)); // 2*10.0 + 3*5.5 = 36.5
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap().unit_price, Decimal::new(100, 1));
    }

    #[test]
    fn test_price_lines_snapshot_price_is_kept_per_line() {
        let parsed = vec![(ProductId::new(1), 2.0)];
        let prices = HashMap::from([(ProductId::new(1), Decimal::from(10))]);

        let (lines, total) = price_lines(&parsed, &prices).unwrap();
        let line = lines.first().unwrap();
        assert_eq!(line.unit_price, Decimal::from(10));
        assert_eq!(total, Decimal::from(20));
    }

    #[test]
    fn test_value_as_i64_integral_float_accepted() {
        assert_eq!(value_as_i64(&json!(3.0)), Some(3));
        assert_eq!(value_as_i64(&json!(3.5)), None);
    }
}

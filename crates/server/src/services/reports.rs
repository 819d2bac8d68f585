//! Aggregate reports computed from the cache projections.
//!
//! Both reports are linear scans over cache-resident structures: spending
//! walks the entire sorted index and reads every order hash; best-sellers
//! enumerates every sold-quantity counter. Neither touches the orders
//! tables in the database (best-sellers reads the catalog once, for
//! product names). Entries that fail to coerce are skipped, never fatal.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use orderflow_core::{ProductId, UserId};

use crate::cache::{CacheError, OrderCache, coerce, product_id_from_sold_qty_key};
use crate::db::{ProductRepository, RepositoryError};

/// Errors from report computation.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Ledger(#[from] RepositoryError),
}

/// One row of the highest-spending-users report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSpending {
    pub user_id: UserId,
    pub total_spent: Decimal,
}

/// One row of the best-selling-products report.
///
/// `quantity` is the cumulative units sold since the counter was created;
/// deleting an order does not reduce it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
}

/// Report queries over the cache (and the catalog, for names).
#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
    cache: OrderCache,
}

impl ReportService {
    /// Create a new report service over explicit store handles.
    #[must_use]
    pub const fn new(pool: PgPool, cache: OrderCache) -> Self {
        Self { pool, cache }
    }

    /// The `limit` highest-spending users, descending by aggregated total
    /// (ties broken by ascending user id).
    ///
    /// Scans the whole index regardless of `limit`: the top spender may
    /// well be buried in old orders.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the cache scan fails.
    pub async fn highest_spending_users(
        &self,
        limit: usize,
    ) -> Result<Vec<UserSpending>, ReportError> {
        let hashes = self.cache.all_order_hashes().await?;

        let mut totals: HashMap<UserId, Decimal> = HashMap::new();
        for raw in &hashes {
            let Some(user_id) = raw.get("user_id").and_then(|s| coerce::to_i64(s)) else {
                continue;
            };
            let Some(amount) = raw.get("total_amount").and_then(|s| coerce::to_decimal(s))
            else {
                continue;
            };
            *totals.entry(UserId::new(user_id)).or_default() += amount;
        }

        Ok(rank_spending(totals, limit))
    }

    /// The `limit` best-selling products by cumulative quantity sold,
    /// descending (ties broken by ascending product id), decorated with
    /// catalog names.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the counter scan or the name lookup fails.
    pub async fn best_selling_products(
        &self,
        limit: usize,
    ) -> Result<Vec<ProductSales>, ReportError> {
        let counters = self.cache.sold_quantity_counters().await?;
        let ranked = rank_counters(&counters, limit);

        let ids: Vec<ProductId> = ranked.iter().map(|(id, _)| *id).collect();
        let names = ProductRepository::new(&self.pool).names_by_ids(&ids).await?;

        Ok(ranked
            .into_iter()
            .map(|(product_id, quantity)| ProductSales {
                product_id,
                name: names
                    .get(&product_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Product {product_id}")),
                quantity,
            })
            .collect())
    }
}

/// Sort accumulated per-user totals: descending by total, ascending user
/// id on ties, truncated to `limit`.
fn rank_spending(totals: HashMap<UserId, Decimal>, limit: usize) -> Vec<UserSpending> {
    let mut ranked: Vec<UserSpending> = totals
        .into_iter()
        .map(|(user_id, total_spent)| UserSpending {
            user_id,
            total_spent,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then(a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Parse and rank raw counter entries: descending by quantity, ascending
/// product id on ties, truncated to `limit`. Entries with an unparsable
/// key or value are skipped.
fn rank_counters(counters: &[(String, Option<String>)], limit: usize) -> Vec<(ProductId, i64)> {
    let mut ranked: Vec<(ProductId, i64)> = counters
        .iter()
        .filter_map(|(key, value)| {
            let product_id = product_id_from_sold_qty_key(key)?;
            let quantity = value.as_deref().and_then(coerce::to_i64)?;
            Some((product_id, quantity))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_spending_descending_with_accumulation() {
        // Two orders of 30 and 20 outrank a single order of 45.
        let totals = HashMap::from([
            (UserId::new(1), Decimal::from(50)),
            (UserId::new(2), Decimal::from(45)),
        ]);

        let ranked = rank_spending(totals, 10);
        assert_eq!(
            ranked,
            vec![
                UserSpending {
                    user_id: UserId::new(1),
                    total_spent: Decimal::from(50),
                },
                UserSpending {
                    user_id: UserId::new(2),
                    total_spent: Decimal::from(45),
                },
            ]
        );
    }

    #[test]
    fn test_rank_spending_tie_breaks_by_ascending_user_id() {
        let totals = HashMap::from([
            (UserId::new(9), Decimal::from(10)),
            (UserId::new(3), Decimal::from(10)),
        ]);

        let ranked = rank_spending(totals, 10);
        let ids: Vec<i64> = ranked.iter().map(|r| r.user_id.as_i64()).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn test_rank_spending_truncates_to_limit() {
        let totals = HashMap::from([
            (UserId::new(1), Decimal::from(3)),
            (UserId::new(2), Decimal::from(2)),
            (UserId::new(3), Decimal::from(1)),
        ]);

        assert_eq!(rank_spending(totals, 2).len(), 2);
    }

    #[test]
    fn test_rank_counters_descending_by_quantity() {
        let counters = vec![
            ("product:1:sold_qty".to_string(), Some("5".to_string())),
            ("product:2:sold_qty".to_string(), Some("12".to_string())),
        ];

        let ranked = rank_counters(&counters, 10);
        assert_eq!(
            ranked,
            vec![(ProductId::new(2), 12), (ProductId::new(1), 5)]
        );
    }

    #[test]
    fn test_rank_counters_skips_unparsable_entries() {
        let counters = vec![
            ("product:1:sold_qty".to_string(), Some("5".to_string())),
            ("product:bad:sold_qty".to_string(), Some("7".to_string())),
            ("product:2:sold_qty".to_string(), None),
            ("product:3:sold_qty".to_string(), Some("oops".to_string())),
        ];

        let ranked = rank_counters(&counters, 10);
        assert_eq!(ranked, vec![(ProductId::new(1), 5)]);
    }

    #[test]
    fn test_rank_counters_tie_breaks_by_ascending_product_id() {
        let counters = vec![
            ("product:8:sold_qty".to_string(), Some("4".to_string())),
            ("product:2:sold_qty".to_string(), Some("4".to_string())),
        ];

        let ranked = rank_counters(&counters, 10);
        assert_eq!(
            ranked,
            vec![(ProductId::new(2), 4), (ProductId::new(8), 4)]
        );
    }
}

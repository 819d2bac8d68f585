//! One-shot cache rebuild from the ledger database.

use sqlx::PgPool;
use thiserror::Error;

use crate::cache::{CacheError, OrderCache};
use crate::db::{OrderRepository, RepositoryError};

/// Upper bound on orders loaded in one sync pass.
pub const SYNC_LIMIT: i64 = 9999;

/// Errors from a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Ledger(#[from] RepositoryError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Rebuild the cache's order projections from the database if, and only
/// if, the cache holds no order keys at all.
///
/// A non-empty cache is assumed to be already synchronized and left alone
/// (logged, not an error) - staleness is accepted over reconciliation.
/// This also means a sync interrupted mid-batch leaves the cache
/// permanently short until an operator clears the order keys and re-runs.
///
/// An empty cache is loaded with up to [`SYNC_LIMIT`] orders by descending
/// id, written as one pipeline. Only the hash fields `id`, `user_id`, and
/// `total_amount` plus the index entry are reconstructed; line-item detail
/// and sold-quantity counters are not.
///
/// Returns the number of order projections in the cache afterward.
///
/// # Errors
///
/// Returns `SyncError` if the cache scan, the database listing, or the
/// bulk write fails.
pub async fn sync_orders(pool: &PgPool, cache: &OrderCache) -> Result<u64, SyncError> {
    let existing = cache.count_order_keys().await?;
    if existing > 0 {
        tracing::info!(existing, "cache already contains orders, skipping sync");
        return Ok(existing);
    }

    let orders = OrderRepository::new(pool).list_recent(SYNC_LIMIT).await?;
    cache.bulk_load(&orders).await?;

    let loaded = orders.len() as u64;
    tracing::info!(loaded, "cache rebuilt from ledger");
    Ok(loaded)
}

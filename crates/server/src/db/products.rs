//! Product repository for catalog reads.
//!
//! The catalog is owned elsewhere; this service reads prices when pricing
//! an order and names when decorating report rows.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use orderflow_core::ProductId;

use super::RepositoryError;

/// Repository for read-only product lookups.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current catalog prices for exactly the given product ids, as one
    /// batched query. Ids absent from the catalog are simply missing from
    /// the returned map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn prices_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Decimal>, RepositoryError> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();

        let rows: Vec<(i64, Decimal)> =
            sqlx::query_as("SELECT id, price FROM products WHERE id = ANY($1)")
                .bind(&raw_ids)
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, price)| (ProductId::new(id), price))
            .collect())
    }

    /// Product names for the given ids, as one batched query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn names_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, String>, RepositoryError> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();

        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM products WHERE id = ANY($1)")
                .bind(&raw_ids)
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (ProductId::new(id), name))
            .collect())
    }
}

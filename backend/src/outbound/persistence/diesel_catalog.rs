//! PostgreSQL-backed brand and category read adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{collect_rows, diesel_error_message, pool_error_message};
use super::models::{BrandRow, CategoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{brands, categories};
use crate::domain::catalog::{Brand, Category};
use crate::domain::ports::{CatalogRepository, CatalogRepositoryError};

/// Diesel-backed implementation of the catalog read port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new adapter with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    CatalogRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: &diesel::result::Error) -> CatalogRepositoryError {
    CatalogRepositoryError::query(diesel_error_message(error, "catalog read"))
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrandRow> = brands::table
            .select(BrandRow::as_select())
            .order_by(brands::slug)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(BrandRow::into_domain),
            CatalogRepositoryError::query,
        )
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .select(CategoryRow::as_select())
            .order_by((categories::position, categories::slug))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(CategoryRow::into_domain),
            CatalogRepositoryError::query,
        )
    }
}

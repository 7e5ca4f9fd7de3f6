//! PostgreSQL-backed vehicle fitment read adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_helpers::{collect_rows, diesel_error_message, pool_error_message};
use super::models::{VehicleBrandRow, VehicleEngineRow, VehicleModelRow};
use super::pool::{DbPool, PoolError};
use super::schema::{vehicle_brands, vehicle_engines, vehicle_models};
use crate::domain::ports::{VehicleCatalog, VehicleCatalogError};
use crate::domain::vehicles::{VehicleBrand, VehicleEngine, VehicleModel};

/// Diesel-backed implementation of the vehicle read port.
#[derive(Clone)]
pub struct DieselVehicleCatalog {
    pool: DbPool,
}

impl DieselVehicleCatalog {
    /// Create a new adapter with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VehicleCatalogError {
    VehicleCatalogError::connection(pool_error_message(error))
}

fn map_diesel_error(error: &diesel::result::Error) -> VehicleCatalogError {
    VehicleCatalogError::query(diesel_error_message(error, "vehicle read"))
}

#[async_trait]
impl VehicleCatalog for DieselVehicleCatalog {
    async fn list_brands(&self) -> Result<Vec<VehicleBrand>, VehicleCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<VehicleBrandRow> = vehicle_brands::table
            .select(VehicleBrandRow::as_select())
            .order_by(vehicle_brands::slug)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(VehicleBrandRow::into_domain),
            VehicleCatalogError::query,
        )
    }

    async fn models_for_brand(
        &self,
        brand_slug: &str,
    ) -> Result<Vec<VehicleModel>, VehicleCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let brand_ids = vehicle_brands::table
            .filter(vehicle_brands::slug.eq(brand_slug.to_owned()))
            .select(vehicle_brands::id);
        let rows: Vec<VehicleModelRow> = vehicle_models::table
            .filter(vehicle_models::vehicle_brand_id.eq_any(brand_ids))
            .select(VehicleModelRow::as_select())
            .order_by((vehicle_models::year_from, vehicle_models::slug))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(VehicleModelRow::into_domain),
            VehicleCatalogError::query,
        )
    }

    async fn engines_for_model(
        &self,
        model_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<VehicleEngine>, VehicleCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = vehicle_engines::table
            .filter(vehicle_engines::model_id.eq(model_id))
            .select(VehicleEngineRow::as_select())
            .into_boxed();
        if let Some(year) = year {
            query = query.filter(vehicle_engines::year_from.le(year)).filter(
                vehicle_engines::year_to
                    .is_null()
                    .or(vehicle_engines::year_to.assume_not_null().ge(year)),
            );
        }
        let rows: Vec<VehicleEngineRow> = query
            .order_by((vehicle_engines::code, vehicle_engines::id))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(VehicleEngineRow::into_domain),
            VehicleCatalogError::query,
        )
    }
}

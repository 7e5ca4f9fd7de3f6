//! Catalog seeding for development and demo environments.
//!
//! Used by the `seed` binary to load a small demo catalog. Every write is an
//! id-keyed upsert so reseeding converges instead of duplicating.

use diesel_async::RunQueryDsl;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{
    NewBrandRow, NewCategoryRow, NewFitmentRow, NewProductRow, NewVehicleBrandRow,
    NewVehicleEngineRow, NewVehicleModelRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    brands, categories, product_fitments, products, vehicle_brands, vehicle_engines,
    vehicle_models,
};
use crate::domain::catalog::{Brand, Category, Product};
use crate::domain::vehicles::{VehicleBrand, VehicleEngine, VehicleModel};

/// Errors raised while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Pool checkout failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// A write failed.
    #[error("seed write failed: {0}")]
    Write(#[from] diesel::result::Error),
}

/// Id-keyed upsert writer for the demo catalog.
#[derive(Clone)]
pub struct DieselSeeder {
    pool: DbPool,
}

impl DieselSeeder {
    /// Create a new seeder over the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upsert one part brand.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_brand(&self, brand: &Brand) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewBrandRow {
            id: brand.id(),
            slug: brand.slug(),
            name: brand.name(),
            logo_url: brand.logo_url(),
            country: brand.country(),
        };
        diesel::insert_into(brands::table)
            .values(&row)
            .on_conflict(brands::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upsert one category.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_category(&self, category: &Category) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewCategoryRow {
            id: category.id(),
            slug: category.slug(),
            name: category.name(),
            parent_id: category.parent_id(),
            position: category.position(),
        };
        diesel::insert_into(categories::table)
            .values(&row)
            .on_conflict(categories::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upsert one product.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_product(&self, product: &Product) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewProductRow {
            id: product.id(),
            slug: product.slug(),
            sku: product.sku(),
            name: product.name(),
            description: product.description(),
            brand_id: product.brand_id(),
            category_id: product.category_id(),
            price_minor: product.price().minor(),
            compare_at_minor: product.compare_at().map(|price| price.minor()),
            stock: product.stock(),
            image_urls: product.image_urls().to_vec(),
            oem_refs: product.oem_refs().to_vec(),
        };
        diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upsert one vehicle make.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_vehicle_brand(&self, brand: &VehicleBrand) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewVehicleBrandRow {
            id: brand.id,
            slug: &brand.slug,
            name: &brand.name,
        };
        diesel::insert_into(vehicle_brands::table)
            .values(&row)
            .on_conflict(vehicle_brands::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upsert one vehicle model.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_vehicle_model(&self, model: &VehicleModel) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewVehicleModelRow {
            id: model.id,
            vehicle_brand_id: model.vehicle_brand_id,
            slug: &model.slug,
            name: &model.name,
            year_from: model.year_from,
            year_to: model.year_to,
        };
        diesel::insert_into(vehicle_models::table)
            .values(&row)
            .on_conflict(vehicle_models::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upsert one engine.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or the write fails.
    pub async fn upsert_vehicle_engine(&self, engine: &VehicleEngine) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        let row = NewVehicleEngineRow {
            id: engine.id,
            model_id: engine.model_id,
            code: &engine.code,
            name: &engine.name,
            fuel: engine.fuel.as_str(),
            power_kw: engine.power_kw,
            year_from: engine.year_from,
            year_to: engine.year_to,
        };
        diesel::insert_into(vehicle_engines::table)
            .values(&row)
            .on_conflict(vehicle_engines::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Replace a product's fitment set.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the pool or a write fails.
    pub async fn set_fitments(
        &self,
        product_id: Uuid,
        engine_ids: &[Uuid],
    ) -> Result<(), SeedError> {
        let mut conn = self.pool.get().await?;
        diesel::delete(
            product_fitments::table.filter(product_fitments::product_id.eq(product_id)),
        )
        .execute(&mut conn)
        .await?;
        let rows: Vec<NewFitmentRow> = engine_ids
            .iter()
            .map(|engine_id| NewFitmentRow {
                product_id,
                engine_id: *engine_id,
            })
            .collect();
        diesel::insert_into(product_fitments::table)
            .values(&rows)
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}

//! Read-side port for the vehicle fitment hierarchy.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::vehicles::{VehicleBrand, VehicleEngine, VehicleModel};

/// Errors raised when reading vehicle data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleCatalogError {
    /// Repository connection could not be established.
    #[error("vehicle read connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query failed during execution or row conversion.
    #[error("vehicle read query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl VehicleCatalogError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for walking the make → model → engine chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    /// All vehicle makes, ordered by slug.
    async fn list_brands(&self) -> Result<Vec<VehicleBrand>, VehicleCatalogError>;

    /// Models of one make, ordered by first production year then slug.
    ///
    /// An unknown make slug yields an empty list.
    async fn models_for_brand(
        &self,
        brand_slug: &str,
    ) -> Result<Vec<VehicleModel>, VehicleCatalogError>;

    /// Engines of one model, optionally narrowed to those in production
    /// during `year`. An unknown model id yields an empty list.
    async fn engines_for_model(
        &self,
        model_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<VehicleEngine>, VehicleCatalogError>;
}

/// Fixture implementation serving canned vehicle data.
#[derive(Debug, Default, Clone)]
pub struct FixtureVehicleCatalog {
    brands: Vec<VehicleBrand>,
    models: Vec<VehicleModel>,
    engines: Vec<VehicleEngine>,
}

impl FixtureVehicleCatalog {
    /// Build a fixture serving the given hierarchy.
    #[must_use]
    pub fn with_data(
        brands: Vec<VehicleBrand>,
        models: Vec<VehicleModel>,
        engines: Vec<VehicleEngine>,
    ) -> Self {
        Self {
            brands,
            models,
            engines,
        }
    }
}

#[async_trait]
impl VehicleCatalog for FixtureVehicleCatalog {
    async fn list_brands(&self) -> Result<Vec<VehicleBrand>, VehicleCatalogError> {
        Ok(self.brands.clone())
    }

    async fn models_for_brand(
        &self,
        brand_slug: &str,
    ) -> Result<Vec<VehicleModel>, VehicleCatalogError> {
        let brand_id = self
            .brands
            .iter()
            .find(|brand| brand.slug == brand_slug)
            .map(|brand| brand.id);
        Ok(self
            .models
            .iter()
            .filter(|model| Some(model.vehicle_brand_id) == brand_id)
            .cloned()
            .collect())
    }

    async fn engines_for_model(
        &self,
        model_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<VehicleEngine>, VehicleCatalogError> {
        Ok(self
            .engines
            .iter()
            .filter(|engine| engine.model_id == model_id)
            .filter(|engine| year.is_none_or(|y| engine.in_production_during(y)))
            .cloned()
            .collect())
    }
}

//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, CatalogRepository, CheckoutService, OrderRepository, ProductsQuery,
    VehicleCatalog, VehicleLookup,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Account registration, login, and profile reads.
    pub accounts: Arc<dyn AccountService>,
    /// Product listing and lookups.
    pub products: Arc<dyn ProductsQuery>,
    /// Brand and category navigation reads.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Vehicle make/model/engine reads.
    pub vehicles: Arc<dyn VehicleCatalog>,
    /// External VIN decoding.
    pub vin_lookup: Arc<dyn VehicleLookup>,
    /// Order reads for the account area.
    pub orders: Arc<dyn OrderRepository>,
    /// Cart pricing, checkout, and payment callbacks.
    pub checkout: Arc<dyn CheckoutService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account registration, login, and profile reads.
    pub accounts: Arc<dyn AccountService>,
    /// Product listing and lookups.
    pub products: Arc<dyn ProductsQuery>,
    /// Brand and category navigation reads.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Vehicle make/model/engine reads.
    pub vehicles: Arc<dyn VehicleCatalog>,
    /// External VIN decoding.
    pub vin_lookup: Arc<dyn VehicleLookup>,
    /// Order reads for the account area.
    pub orders: Arc<dyn OrderRepository>,
    /// Cart pricing, checkout, and payment callbacks.
    pub checkout: Arc<dyn CheckoutService>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            products,
            catalog,
            vehicles,
            vin_lookup,
            orders,
            checkout,
        } = ports;
        Self {
            accounts,
            products,
            catalog,
            vehicles,
            vin_lookup,
            orders,
            checkout,
        }
    }
}

//! PostgreSQL persistence adapters (Diesel + diesel-async).

mod diesel_account_service;
mod diesel_catalog;
mod diesel_helpers;
mod diesel_order_repository;
mod diesel_products;
mod diesel_vehicle_catalog;
mod migrations;
mod models;
mod pool;
pub mod schema;
mod seed;

pub use diesel_account_service::DieselAccountService;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use diesel_catalog::DieselCatalogRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_products::DieselProductsQuery;
pub use diesel_vehicle_catalog::DieselVehicleCatalog;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use seed::{DieselSeeder, SeedError};

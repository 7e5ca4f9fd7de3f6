//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. Conversions to domain entities run through the validating
//! constructors so a corrupt row surfaces as a query error instead of an
//! invalid entity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    brands, categories, customers, order_items, orders, product_fitments, products,
    vehicle_brands, vehicle_engines, vehicle_models,
};
use crate::domain::catalog::{
    Brand, BrandDraft, Category, CategoryDraft, Product, ProductDraft,
};
use crate::domain::money::Money;
use crate::domain::vehicles::{Fuel, VehicleBrand, VehicleEngine, VehicleModel};

/// Row struct for reading brands.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BrandRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub country: Option<String>,
}

impl BrandRow {
    pub(crate) fn into_domain(self) -> Result<Brand, String> {
        Brand::new(BrandDraft {
            id: self.id,
            slug: self.slug,
            name: self.name,
            logo_url: self.logo_url,
            country: self.country,
        })
        .map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding brands.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = brands)]
pub(crate) struct NewBrandRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub name: &'a str,
    pub logo_url: Option<&'a str>,
    pub country: Option<&'a str>,
}

/// Row struct for reading categories.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub position: i32,
}

impl CategoryRow {
    pub(crate) fn into_domain(self) -> Result<Category, String> {
        Category::new(CategoryDraft {
            id: self.id,
            slug: self.slug,
            name: self.name,
            parent_id: self.parent_id,
            position: self.position,
        })
        .map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding categories.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub name: &'a str,
    pub parent_id: Option<Uuid>,
    pub position: i32,
}

/// Row struct for reading products.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub slug: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub price_minor: i64,
    pub compare_at_minor: Option<i64>,
    pub stock: i32,
    pub image_urls: Vec<String>,
    pub oem_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_domain(self) -> Result<Product, String> {
        let price = Money::from_minor(self.price_minor).map_err(|e| e.to_string())?;
        let compare_at = self
            .compare_at_minor
            .map(Money::from_minor)
            .transpose()
            .map_err(|e| e.to_string())?;
        Product::new(ProductDraft {
            id: self.id,
            slug: self.slug,
            sku: self.sku,
            name: self.name,
            description: self.description,
            brand_id: self.brand_id,
            category_id: self.category_id,
            price,
            compare_at,
            stock: self.stock,
            image_urls: self.image_urls,
            oem_refs: self.oem_refs,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
        .map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding products.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub sku: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub price_minor: i64,
    pub compare_at_minor: Option<i64>,
    pub stock: i32,
    pub image_urls: Vec<String>,
    pub oem_refs: Vec<String>,
}

/// Row struct for reading vehicle brands.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vehicle_brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VehicleBrandRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

impl VehicleBrandRow {
    pub(crate) fn into_domain(self) -> Result<VehicleBrand, String> {
        VehicleBrand::new(self.id, self.slug, self.name).map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding vehicle brands.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = vehicle_brands)]
pub(crate) struct NewVehicleBrandRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub name: &'a str,
}

/// Row struct for reading vehicle models.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vehicle_models)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VehicleModelRow {
    pub id: Uuid,
    pub vehicle_brand_id: Uuid,
    pub slug: String,
    pub name: String,
    pub year_from: i32,
    pub year_to: Option<i32>,
}

impl VehicleModelRow {
    pub(crate) fn into_domain(self) -> Result<VehicleModel, String> {
        VehicleModel::new(
            self.id,
            self.vehicle_brand_id,
            self.slug,
            self.name,
            self.year_from,
            self.year_to,
        )
        .map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding vehicle models.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = vehicle_models)]
pub(crate) struct NewVehicleModelRow<'a> {
    pub id: Uuid,
    pub vehicle_brand_id: Uuid,
    pub slug: &'a str,
    pub name: &'a str,
    pub year_from: i32,
    pub year_to: Option<i32>,
}

/// Row struct for reading vehicle engines.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vehicle_engines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VehicleEngineRow {
    pub id: Uuid,
    pub model_id: Uuid,
    pub code: String,
    pub name: String,
    pub fuel: String,
    pub power_kw: i32,
    pub year_from: i32,
    pub year_to: Option<i32>,
}

impl VehicleEngineRow {
    pub(crate) fn into_domain(self) -> Result<VehicleEngine, String> {
        let fuel = Fuel::parse(&self.fuel).ok_or_else(|| format!("unknown fuel: {}", self.fuel))?;
        VehicleEngine::new(
            self.id,
            self.model_id,
            self.code,
            self.name,
            fuel,
            self.power_kw,
            self.year_from,
            self.year_to,
        )
        .map_err(|e| e.to_string())
    }
}

/// Insertable struct for seeding vehicle engines.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = vehicle_engines)]
pub(crate) struct NewVehicleEngineRow<'a> {
    pub id: Uuid,
    pub model_id: Uuid,
    pub code: &'a str,
    pub name: &'a str,
    pub fuel: &'a str,
    pub power_kw: i32,
    pub year_from: i32,
    pub year_to: Option<i32>,
}

/// Insertable struct for seeding fitments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_fitments)]
pub(crate) struct NewFitmentRow {
    pub product_id: Uuid,
    pub engine_id: Uuid,
}

/// Row struct for reading customers, including the password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new customer accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading orders.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub reference: String,
    pub customer_id: Option<Uuid>,
    pub email: String,
    pub recipient: String,
    pub phone: String,
    pub city: String,
    pub postcode: String,
    pub address_line: String,
    pub note: Option<String>,
    pub subtotal_minor: i64,
    pub delivery_minor: i64,
    pub total_minor: i64,
    pub status: String,
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating orders.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub reference: &'a str,
    pub customer_id: Option<Uuid>,
    pub email: &'a str,
    pub recipient: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub postcode: &'a str,
    pub address_line: &'a str,
    pub note: Option<&'a str>,
    pub subtotal_minor: i64,
    pub delivery_minor: i64,
    pub total_minor: i64,
    pub status: &'a str,
}

/// Row struct for reading order lines.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderItemRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit_price_minor: i64,
    pub quantity: i32,
}

/// Insertable struct for creating order lines.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub(crate) struct NewOrderItemRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub sku: &'a str,
    pub name: &'a str,
    pub unit_price_minor: i64,
    pub quantity: i32,
}

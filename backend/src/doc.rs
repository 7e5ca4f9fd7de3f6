//! OpenAPI document assembled from the handler annotations.
//!
//! Served by Swagger UI in debug builds only; release binaries expose the
//! JSON document to tooling via `utoipa::OpenApi::openapi()` without the UI.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session-cookie security scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chasti storefront API",
        description = "JSON API for the Chasti auto-parts storefront: catalog, vehicle fitment, cart, checkout, orders, and accounts."
    ),
    paths(
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::catalog::list_brands,
        crate::inbound::http::catalog::list_categories,
        crate::inbound::http::vehicles::list_vehicle_brands,
        crate::inbound::http::vehicles::list_vehicle_models,
        crate::inbound::http::vehicles::list_vehicle_engines,
        crate::inbound::http::vehicles::decode_vin,
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::add_cart_item,
        crate::inbound::http::cart::set_cart_item_quantity,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::checkout::checkout,
        crate::inbound::http::payments::payment_callback,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::account::register,
        crate::inbound::http::account::login,
        crate::inbound::http::account::logout,
        crate::inbound::http::account::current_customer,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::error::ErrorCode,
        crate::domain::money::Money,
        crate::domain::catalog::Product,
        crate::domain::catalog::Brand,
        crate::domain::catalog::Category,
        crate::domain::catalog::CategoryNode,
        crate::domain::vehicles::VehicleBrand,
        crate::domain::vehicles::VehicleModel,
        crate::domain::vehicles::VehicleEngine,
        crate::domain::vehicles::Fuel,
        crate::domain::vehicles::VinCandidate,
        crate::domain::customer::Customer,
        crate::domain::orders::OrderStatus,
        crate::domain::orders::OrderLine,
        crate::domain::orders::OrderTotals,
        crate::domain::orders::ShippingAddress,
        crate::domain::ports::CartQuote,
        crate::domain::ports::PricedCartLine,
        crate::inbound::http::products::ProductListResponse,
        crate::inbound::http::cart::AddItemRequest,
        crate::inbound::http::cart::SetQuantityRequest,
        crate::inbound::http::checkout::CheckoutRequest,
        crate::inbound::http::checkout::CheckoutResponse,
        crate::inbound::http::payments::CallbackResponse,
        crate::inbound::http::orders::OrderSummary,
        crate::inbound::http::orders::OrderResponse,
        crate::inbound::http::account::RegisterRequest,
        crate::inbound::http::account::LoginRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "products", description = "Product listing and detail"),
        (name = "catalog", description = "Brand and category navigation"),
        (name = "vehicles", description = "Vehicle fitment chain and VIN decode"),
        (name = "cart", description = "Session cart"),
        (name = "checkout", description = "Cart to order"),
        (name = "payments", description = "Payment provider callbacks"),
        (name = "orders", description = "Order history and detail"),
        (name = "account", description = "Customer accounts"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi as _;

    use super::*;

    #[test]
    fn document_includes_every_storefront_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/products",
            "/api/v1/products/{slug}",
            "/api/v1/brands",
            "/api/v1/categories",
            "/api/v1/vehicles/brands",
            "/api/v1/cart",
            "/api/v1/checkout",
            "/api/v1/payments/callback",
            "/api/v1/orders",
            "/api/v1/account",
            "/healthz/ready",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path in OpenAPI document: {path}"
            );
        }
    }
}

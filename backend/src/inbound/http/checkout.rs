//! Checkout endpoint: turn the session cart into a pending order.
//!
//! ```text
//! POST /api/v1/checkout
//! ```
//!
//! Guest checkout is allowed; an authenticated session attaches the order to
//! the account. On success the cart is cleared and the client is handed the
//! hosted payment redirect.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::customer::EmailAddress;
use crate::domain::money::Money;
use crate::domain::orders::ShippingAddress;
use crate::domain::ports::CheckoutContact;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Checkout request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Contact email for confirmations and guest order lookup.
    pub email: String,
    /// Recipient full name.
    pub recipient: String,
    /// Contact phone.
    pub phone: String,
    /// City or village.
    pub city: String,
    /// Postal code.
    pub postcode: String,
    /// Street address or courier office.
    pub address_line: String,
    /// Optional courier note.
    pub note: Option<String>,
}

/// Checkout response: where to send the customer next.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Human-facing order reference.
    pub reference: String,
    /// Hosted payment page to redirect to.
    pub redirect_url: String,
    /// Grand total that will be charged.
    pub total: Money,
}

/// Place an order from the session cart.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed, redirect to payment", body = CheckoutResponse),
        (status = 400, description = "Empty cart or invalid contact details", body = Error),
        (status = 404, description = "A cart item no longer exists", body = Error),
        (status = 409, description = "Insufficient stock", body = Error),
        (status = 503, description = "Payment provider unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkout"],
    operation_id = "checkout"
)]
#[post("/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let email = EmailAddress::new(request.email).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "email" }))
    })?;
    let address = ShippingAddress::try_from_parts(
        request.recipient,
        request.phone,
        request.city,
        request.postcode,
        request.address_line,
        request.note,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    let contact = CheckoutContact {
        customer_id: session.customer_id()?,
        email,
        address,
    };
    let outcome = state.checkout.place_order(&session.cart(), contact).await?;
    session.clear_cart();

    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(CheckoutResponse {
            reference: outcome.order.reference.to_string(),
            redirect_url: outcome.redirect_url,
            total: outcome.order.totals.total,
        }))
}

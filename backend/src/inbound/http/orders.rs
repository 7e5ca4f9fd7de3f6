//! Order read endpoints for the account area and guest lookup.
//!
//! ```text
//! GET /api/v1/orders
//! GET /api/v1/orders/{reference}?email=
//! ```
//!
//! Guest orders are retrieved with the reference plus the contact email; a
//! wrong email behaves exactly like an unknown reference so the endpoint
//! cannot be used to probe for order existence.

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::money::Money;
use crate::domain::orders::{Order, OrderLine, OrderReference, OrderStatus, ShippingAddress};
use crate::domain::ports::OrderRepositoryError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => Error::service_unavailable(message),
        OrderRepositoryError::NotFound => Error::not_found("order not found"),
        OrderRepositoryError::Query { message } => Error::internal(message),
        // Read endpoints never transition; anything else is a wiring bug.
        other => Error::internal(other.to_string()),
    }
}

/// One row in the account order history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Human-facing reference.
    pub reference: String,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Grand total.
    pub total: Money,
    /// Number of lines.
    pub line_count: usize,
    /// Placement timestamp, RFC 3339.
    pub created_at: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            reference: order.reference.to_string(),
            status: order.status,
            total: order.totals.total,
            line_count: order.lines.len(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// Full order detail.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Human-facing reference.
    pub reference: String,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Contact email.
    pub email: String,
    /// Delivery address.
    pub address: ShippingAddress,
    /// Snapshot lines.
    pub lines: Vec<OrderLine>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Delivery fee.
    pub delivery: Money,
    /// Grand total.
    pub total: Money,
    /// Placement timestamp, RFC 3339.
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            reference: order.reference.to_string(),
            status: order.status,
            email: order.email.to_string(),
            address: order.address,
            lines: order.lines,
            subtotal: order.totals.subtotal,
            delivery: order.totals.delivery,
            total: order.totals.total,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// List the authenticated customer's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (
            status = 200,
            description = "Order history",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [OrderSummary]
        ),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders",
    security(("SessionCookie" = []))
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let customer_id = session.require_customer_id()?;
    let orders = state
        .orders
        .list_for_customer(customer_id)
        .await
        .map_err(map_order_error)?;
    let summaries: Vec<OrderSummary> = orders.iter().map(OrderSummary::from).collect();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(summaries))
}

/// Guest lookup parameter for the order detail endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderDetailQuery {
    /// Contact email, required for guest orders.
    pub email: Option<String>,
}

/// Fetch one order by reference.
///
/// Access requires either an authenticated session owning the order or the
/// matching contact email for guest orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{reference}",
    params(
        ("reference" = String, Path, description = "Order reference, e.g. CH-7K2M9QARZX"),
        OrderDetailQuery
    ),
    responses(
        (
            status = 200,
            description = "Order detail",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = OrderResponse
        ),
        (status = 404, description = "Unknown order or wrong credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{reference}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    reference: web::Path<String>,
    query: web::Query<OrderDetailQuery>,
) -> ApiResult<HttpResponse> {
    let not_found = || Error::not_found("order not found");
    let reference = OrderReference::parse(&reference).ok_or_else(not_found)?;
    let order = state
        .orders
        .find_by_reference(&reference)
        .await
        .map_err(map_order_error)?
        .ok_or_else(not_found)?;

    let owns = match (session.customer_id()?, order.customer_id) {
        (Some(session_customer), Some(owner)) => session_customer == owner,
        _ => false,
    };
    let guest_match = query
        .email
        .as_deref()
        .is_some_and(|email| email.trim().eq_ignore_ascii_case(order.email.as_str()));
    if !owns && !guest_match {
        return Err(not_found());
    }

    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(OrderResponse::from(order)))
}

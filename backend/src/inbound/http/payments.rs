//! Payment provider callback endpoint.
//!
//! ```text
//! POST /api/v1/payments/callback
//! ```
//!
//! The provider signs each callback; verification happens in the payment
//! adapter before the event is interpreted. Replayed callbacks are
//! acknowledged without re-running side effects.

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::orders::OrderStatus;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Signature header set by the payment provider.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Timestamp header set by the payment provider.
pub const TIMESTAMP_HEADER: &str = "x-payment-timestamp";

/// Callback acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    /// Order the callback concerned.
    pub reference: String,
    /// Order status after processing.
    pub status: OrderStatus,
    /// `false` for replays and ignored event types.
    pub acted: bool,
}

fn required_header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, Error> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized(format!("missing {name} header")))
}

/// Receive a signed payment outcome callback.
#[utoipa::path(
    post,
    path = "/api/v1/payments/callback",
    request_body(content = Vec<u8>, description = "Raw signed callback payload"),
    responses(
        (status = 200, description = "Event processed or acknowledged", body = CallbackResponse),
        (status = 400, description = "Malformed or stale callback", body = Error),
        (status = 401, description = "Invalid signature", body = Error),
        (status = 404, description = "Unknown order reference", body = Error),
        (status = 409, description = "Event conflicts with order state", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["payments"],
    operation_id = "paymentCallback"
)]
#[post("/payments/callback")]
pub async fn payment_callback(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = required_header(&req, SIGNATURE_HEADER)?.to_owned();
    let timestamp = required_header(&req, TIMESTAMP_HEADER)?.to_owned();
    let outcome = state
        .checkout
        .handle_callback(&signature, &timestamp, &body)
        .await?;
    Ok(HttpResponse::Ok().json(CallbackResponse {
        reference: outcome.reference.to_string(),
        status: outcome.status,
        acted: outcome.acted,
    }))
}

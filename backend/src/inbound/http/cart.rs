//! Session cart endpoints.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart/items          {"productId":"...","quantity":2}
//! PUT    /api/v1/cart/items/{id}     {"quantity":3}   (0 removes)
//! DELETE /api/v1/cart
//! ```
//!
//! The cart lives in the session cookie; every mutation returns the freshly
//! priced cart so the storefront can re-render totals without a second
//! round-trip.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::cart::CartError;
use crate::domain::ports::{CartQuote, ProductsQueryError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn map_cart_error(error: CartError) -> Error {
    match error {
        CartError::QuantityOutOfRange | CartError::TooManyLines => {
            Error::invalid_request(error.to_string())
        }
        CartError::UnknownLine => Error::not_found(error.to_string()),
    }
}

fn map_products_error(error: ProductsQueryError) -> Error {
    match error {
        ProductsQueryError::Connection { message } => Error::service_unavailable(message),
        ProductsQueryError::Query { message } => Error::internal(message),
    }
}

async fn quote_response(
    state: &web::Data<HttpState>,
    session: &SessionContext,
) -> Result<CartQuote, Error> {
    state.checkout.quote(&session.cart()).await
}

/// View the priced cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (
            status = 200,
            description = "Priced cart",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = CartQuote
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let quote = quote_response(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(quote))
}

/// Body for adding a product to the cart.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Product to add.
    pub product_id: Uuid,
    /// Units to add, merged into an existing line.
    pub quantity: u32,
}

/// Add a product to the cart.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Priced cart after the addition", body = CartQuote),
        (status = 400, description = "Invalid quantity or cart full", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addCartItem"
)]
#[post("/cart/items")]
pub async fn add_cart_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddItemRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let known = state
        .products
        .find_by_ids(&[request.product_id])
        .await
        .map_err(map_products_error)?;
    if known.is_empty() {
        return Err(Error::not_found("product not found"));
    }

    let mut cart = session.cart();
    cart.add(request.product_id, request.quantity)
        .map_err(map_cart_error)?;
    session.save_cart(&cart)?;

    let quote = quote_response(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(quote))
}

/// Body for setting a line quantity.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    /// New quantity; `0` removes the line.
    pub quantity: u32,
}

/// Set a cart line's quantity exactly; zero removes it.
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product in the cart")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Priced cart after the change", body = CartQuote),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 404, description = "Product not in the cart", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "setCartItemQuantity"
)]
#[put("/cart/items/{product_id}")]
pub async fn set_cart_item_quantity(
    state: web::Data<HttpState>,
    session: SessionContext,
    product_id: web::Path<Uuid>,
    payload: web::Json<SetQuantityRequest>,
) -> ApiResult<HttpResponse> {
    let mut cart = session.cart();
    cart.set_quantity(*product_id, payload.quantity)
        .map_err(map_cart_error)?;
    session.save_cart(&cart)?;

    let quote = quote_response(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(quote))
}

/// Empty the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear_cart();
    Ok(HttpResponse::NoContent()
        .insert_header(private_no_store_header())
        .finish())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(CartError::QuantityOutOfRange, ErrorCode::InvalidRequest)]
    #[case(CartError::TooManyLines, ErrorCode::InvalidRequest)]
    #[case(CartError::UnknownLine, ErrorCode::NotFound)]
    fn cart_errors_map_to_expected_codes(#[case] error: CartError, #[case] expected: ErrorCode) {
        assert_eq!(map_cart_error(error).code(), expected);
    }
}

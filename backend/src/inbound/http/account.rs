//! Account endpoints: register, login, logout, current customer.
//!
//! ```text
//! POST /api/v1/account/register {"email":"...","displayName":"...","password":"..."}
//! POST /api/v1/account/login    {"email":"...","password":"..."}
//! POST /api/v1/account/logout
//! GET  /api/v1/account
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::customer::{Customer, CustomerValidationError, LoginCredentials, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn map_validation_error(err: &CustomerValidationError) -> Error {
    let field = match err {
        CustomerValidationError::InvalidEmail => "email",
        CustomerValidationError::InvalidDisplayName => "displayName",
        CustomerValidationError::EmptyPassword | CustomerValidationError::PasswordTooShort => {
            "password"
        }
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Registration request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login email, unique per account.
    pub email: String,
    /// Name shown in the account area.
    pub display_name: String,
    /// Password, at least 8 characters.
    pub password: String,
}

/// Create an account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = Customer),
        (status = 400, description = "Invalid registration fields", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["account"],
    operation_id = "register"
)]
#[post("/account/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let registration =
        Registration::try_from_parts(request.email, request.display_name, request.password)
            .map_err(|err| map_validation_error(&err))?;
    let customer = state.accounts.register(&registration).await?;
    session.persist_customer(customer.id)?;
    Ok(HttpResponse::Created()
        .insert_header(private_no_store_header())
        .json(customer))
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = Customer),
        (status = 400, description = "Malformed credentials", body = Error),
        (status = 401, description = "Invalid email or password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["account"],
    operation_id = "login"
)]
#[post("/account/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(request.email, request.password)
        .map_err(|err| map_validation_error(&err))?;
    let customer = state.accounts.authenticate(&credentials).await?;
    session.persist_customer(customer.id)?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(customer))
}

/// End the authenticated session. The cart survives logout.
#[utoipa::path(
    post,
    path = "/api/v1/account/logout",
    responses(
        (status = 204, description = "Session ended")
    ),
    tags = ["account"],
    operation_id = "logout"
)]
#[post("/account/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.forget_customer();
    Ok(HttpResponse::NoContent()
        .insert_header(private_no_store_header())
        .finish())
}

/// The currently authenticated customer.
#[utoipa::path(
    get,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Current customer", body = Customer),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["account"],
    operation_id = "currentCustomer",
    security(("SessionCookie" = []))
)]
#[get("/account")]
pub async fn current_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let customer_id = session.require_customer_id()?;
    let customer = state.accounts.find(customer_id).await?.ok_or_else(|| {
        // The account was deleted while the cookie was still live.
        Error::unauthorized("login required")
    })?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(customer))
}

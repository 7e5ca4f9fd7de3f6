//! Vehicle fitment chain and VIN decode endpoints.
//!
//! ```text
//! GET /api/v1/vehicles/brands
//! GET /api/v1/vehicles/brands/{slug}/models
//! GET /api/v1/vehicles/models/{id}/engines?year=
//! GET /api/v1/vehicles/vin/{vin}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{VehicleCatalogError, VehicleLookupError};
use crate::domain::vehicles::is_plausible_vin;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::public_listing_header;
use crate::inbound::http::state::HttpState;

fn map_vehicle_error(error: VehicleCatalogError) -> Error {
    match error {
        VehicleCatalogError::Connection { message } => Error::service_unavailable(message),
        VehicleCatalogError::Query { message } => Error::internal(message),
    }
}

fn map_lookup_error(error: VehicleLookupError) -> Error {
    match error {
        VehicleLookupError::InvalidVin { message } => Error::invalid_request(message),
        VehicleLookupError::Timeout { message } | VehicleLookupError::Transport { message } => {
            Error::service_unavailable(message)
        }
        VehicleLookupError::Decode { message } => Error::internal(message),
    }
}

/// List vehicle makes.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/brands",
    responses(
        (
            status = 200,
            description = "Vehicle makes ordered by slug",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [crate::domain::vehicles::VehicleBrand]
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "listVehicleBrands"
)]
#[get("/vehicles/brands")]
pub async fn list_vehicle_brands(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let brands = state
        .vehicles
        .list_brands()
        .await
        .map_err(map_vehicle_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(brands))
}

/// List models of one make. Unknown makes yield an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/brands/{slug}/models",
    params(("slug" = String, Path, description = "Vehicle make slug")),
    responses(
        (
            status = 200,
            description = "Models of the make",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [crate::domain::vehicles::VehicleModel]
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "listVehicleModels"
)]
#[get("/vehicles/brands/{slug}/models")]
pub async fn list_vehicle_models(
    state: web::Data<HttpState>,
    slug: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let models = state
        .vehicles
        .models_for_brand(&slug)
        .await
        .map_err(map_vehicle_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(models))
}

/// Optional production-year narrowing for the engine listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EngineQuery {
    /// Keep only engines in production during this year.
    pub year: Option<i32>,
}

/// List engines of one model, optionally narrowed by production year.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/models/{id}/engines",
    params(
        ("id" = Uuid, Path, description = "Vehicle model id"),
        EngineQuery
    ),
    responses(
        (
            status = 200,
            description = "Engines of the model",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [crate::domain::vehicles::VehicleEngine]
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "listVehicleEngines"
)]
#[get("/vehicles/models/{id}/engines")]
pub async fn list_vehicle_engines(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
    query: web::Query<EngineQuery>,
) -> ApiResult<HttpResponse> {
    let engines = state
        .vehicles
        .engines_for_model(*id, query.year)
        .await
        .map_err(map_vehicle_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(engines))
}

/// Decode a VIN into vehicle candidates via the external data service.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/vin/{vin}",
    params(("vin" = String, Path, description = "17-character VIN")),
    responses(
        (
            status = 200,
            description = "Decoded candidates, possibly empty",
            body = [crate::domain::vehicles::VinCandidate]
        ),
        (status = 400, description = "Implausible VIN", body = Error),
        (status = 503, description = "Decode service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "decodeVin"
)]
#[get("/vehicles/vin/{vin}")]
pub async fn decode_vin(
    state: web::Data<HttpState>,
    vin: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let vin = vin.trim().to_ascii_uppercase();
    if !is_plausible_vin(&vin) {
        return Err(Error::invalid_request(
            "VIN must be 17 characters without I, O, or Q",
        ));
    }
    let candidates = state
        .vin_lookup
        .decode_vin(&vin)
        .await
        .map_err(map_lookup_error)?;
    Ok(HttpResponse::Ok().json(candidates))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(VehicleLookupError::invalid_vin("bad"), ErrorCode::InvalidRequest)]
    #[case(VehicleLookupError::timeout("slow"), ErrorCode::ServiceUnavailable)]
    #[case(VehicleLookupError::transport("down"), ErrorCode::ServiceUnavailable)]
    #[case(VehicleLookupError::decode("garbage"), ErrorCode::InternalError)]
    fn lookup_errors_map_to_expected_codes(
        #[case] error: VehicleLookupError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_lookup_error(error).code(), expected);
    }
}

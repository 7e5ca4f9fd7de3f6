//! Brand and category navigation endpoints.
//!
//! ```text
//! GET /api/v1/brands
//! GET /api/v1/categories
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::domain::catalog::build_category_tree;
use crate::domain::ports::CatalogRepositoryError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::public_listing_header;
use crate::inbound::http::state::HttpState;

fn map_catalog_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => Error::service_unavailable(message),
        CatalogRepositoryError::Query { message } => Error::internal(message),
    }
}

/// List all part brands.
#[utoipa::path(
    get,
    path = "/api/v1/brands",
    responses(
        (
            status = 200,
            description = "Part brands ordered by slug",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [crate::domain::catalog::Brand]
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "listBrands"
)]
#[get("/brands")]
pub async fn list_brands(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let brands = state
        .catalog
        .list_brands()
        .await
        .map_err(map_catalog_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(brands))
}

/// The category navigation tree: root sections with their leaves.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (
            status = 200,
            description = "Two-level category tree",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [crate::domain::catalog::CategoryNode]
        ),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let categories = state
        .catalog
        .list_categories()
        .await
        .map_err(map_catalog_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(build_category_tree(categories)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn connection_failures_surface_as_unavailable() {
        let err = map_catalog_error(CatalogRepositoryError::connection("pool exhausted"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[test]
    fn query_failures_surface_as_internal() {
        let err = map_catalog_error(CatalogRepositoryError::query("bad row"));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}

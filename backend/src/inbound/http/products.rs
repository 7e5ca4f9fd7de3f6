//! Product listing and detail endpoints.
//!
//! ```text
//! GET /api/v1/products?q=&brand=&category=&engine=&min_price=&max_price=&in_stock=&sort=&page=&per_page=&cursor=
//! GET /api/v1/products/{slug}
//! ```
//!
//! Every query parameter maps onto one [`ProductFilter`] field; `cursor`
//! replaces the explicit page pair when a client follows a `next` token.

use actix_web::{HttpResponse, get, web};
use pagination::{ContinuationToken, PageRequest, Paginated};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::catalog::{Product, ProductFilter, SortKey};
use crate::domain::money::Money;
use crate::domain::ports::ProductsQueryError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::public_listing_header;
use crate::inbound::http::state::HttpState;

/// Query parameters accepted by the product listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Free-text search over name, SKU, and OEM references.
    pub q: Option<String>,
    /// Comma-separated brand slugs, OR-combined.
    pub brand: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Vehicle engine id from the fitment chain.
    pub engine: Option<Uuid>,
    /// Inclusive minimum price in stotinki.
    pub min_price: Option<i64>,
    /// Inclusive maximum price in stotinki.
    pub max_price: Option<i64>,
    /// Exclude items with zero stock.
    pub in_stock: Option<bool>,
    /// Sort order: `newest`, `price_asc`, `price_desc`, `name`.
    pub sort: Option<String>,
    /// 1-based page number; ignored when `cursor` is present.
    pub page: Option<u32>,
    /// Page size, clamped server-side; ignored when `cursor` is present.
    pub per_page: Option<u32>,
    /// Continuation token from a previous response.
    pub cursor: Option<String>,
}

/// Listing response envelope.
#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    /// Products on this page, in listing order.
    pub items: Vec<Product>,
    /// 1-based page number.
    pub page: u32,
    /// Page size in effect.
    pub per_page: u32,
    /// Total matching products.
    pub total: i64,
    /// Continuation token for the next page, absent on the final page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl From<Paginated<Product>> for ProductListResponse {
    fn from(page: Paginated<Product>) -> Self {
        Self {
            items: page.items,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            next: page.next.map(|token| token.to_string()),
        }
    }
}

fn money_bound(minor: Option<i64>, field: &str) -> Result<Option<Money>, Error> {
    minor
        .map(|value| {
            Money::from_minor(value).map_err(|err| {
                Error::invalid_request(format!("{field}: {err}"))
                    .with_details(serde_json::json!({ "field": field }))
            })
        })
        .transpose()
}

/// Translate the raw query into a validated filter and page request.
fn build_listing_request(query: ProductListQuery) -> Result<(ProductFilter, PageRequest), Error> {
    let page = match &query.cursor {
        Some(cursor) => ContinuationToken::decode(cursor)
            .map_err(|err| Error::invalid_request(err.to_string()))?,
        None => PageRequest::from_params(query.page, query.per_page),
    };

    let mut filter = ProductFilter::all();
    if let Some(term) = query.q {
        filter = filter.with_term(term);
    }
    if let Some(brands) = query.brand {
        filter = filter.with_brands(brands.split(',').map(str::to_owned).collect());
    }
    if let Some(category) = query.category {
        filter = filter.with_category(category);
    }
    if let Some(engine) = query.engine {
        filter = filter.with_engine(engine);
    }
    let min = money_bound(query.min_price, "min_price")?;
    let max = money_bound(query.max_price, "max_price")?;
    filter = filter
        .with_price_range(min, max)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    filter = filter.in_stock_only(query.in_stock.unwrap_or(false));
    if let Some(sort) = query.sort {
        filter = filter.sorted_by(SortKey::from_param(&sort));
    }
    Ok((filter, page))
}

fn map_products_error(error: ProductsQueryError) -> Error {
    match error {
        ProductsQueryError::Connection { message } => Error::service_unavailable(message),
        ProductsQueryError::Query { message } => Error::internal(message),
    }
}

/// List products matching the filter parameters.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (
            status = 200,
            description = "Filtered product listing",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = ProductListResponse
        ),
        (status = 400, description = "Invalid filter parameters", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<HttpResponse> {
    let (filter, page) = build_listing_request(query.into_inner())?;
    let listing = state
        .products
        .list(&filter, page)
        .await
        .map_err(map_products_error)?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(ProductListResponse::from(listing)))
}

/// Fetch one product by slug.
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}",
    params(("slug" = String, Path, description = "Product URL slug")),
    responses(
        (
            status = 200,
            description = "Product detail",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = Product
        ),
        (status = 404, description = "Unknown product", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{slug}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    slug: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product = state
        .products
        .find_by_slug(&slug)
        .await
        .map_err(map_products_error)?
        .ok_or_else(|| Error::not_found("product not found"))?;
    Ok(HttpResponse::Ok()
        .insert_header(public_listing_header())
        .json(product))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn query(overrides: impl FnOnce(&mut ProductListQuery)) -> ProductListQuery {
        let mut query = ProductListQuery::default();
        overrides(&mut query);
        query
    }

    #[test]
    fn defaults_produce_the_match_all_filter() {
        let (filter, page) = build_listing_request(query(|_| {})).expect("defaults valid");
        assert_eq!(filter, ProductFilter::all());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn brand_parameter_splits_on_commas() {
        let (filter, _) = build_listing_request(query(|q| {
            q.brand = Some("bosch, febi,trw".to_owned());
        }))
        .expect("brand list valid");
        assert_eq!(filter.brand_slugs(), ["bosch", "febi", "trw"]);
    }

    #[test]
    fn cursor_overrides_explicit_page_parameters() {
        let token = ContinuationToken::for_request(PageRequest::new(3, 12));
        let (_, page) = build_listing_request(query(|q| {
            q.cursor = Some(token.to_string());
            q.page = Some(1);
            q.per_page = Some(99);
        }))
        .expect("cursor valid");
        assert_eq!(page, PageRequest::new(3, 12));
    }

    #[rstest]
    #[case::negative_min(Some(-1), None)]
    #[case::negative_max(None, Some(-5))]
    fn negative_price_bounds_are_rejected(#[case] min: Option<i64>, #[case] max: Option<i64>) {
        let err = build_listing_request(query(|q| {
            q.min_price = min;
            q.max_price = max;
        }))
        .expect_err("negative bound should be rejected");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let err = build_listing_request(query(|q| {
            q.min_price = Some(5_000);
            q.max_price = Some(100);
        }))
        .expect_err("inverted range should be rejected");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[test]
    fn garbage_cursor_is_rejected() {
        let err = build_listing_request(query(|q| {
            q.cursor = Some("!!!".to_owned());
        }))
        .expect_err("garbage cursor should be rejected");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}

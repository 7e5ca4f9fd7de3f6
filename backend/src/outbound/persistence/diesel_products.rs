//! PostgreSQL-backed product read adapter.
//!
//! Translates the domain [`ProductFilter`] one-to-one into Diesel
//! predicates: one populated filter field, one SQL predicate. The same
//! filter set is applied to both the page query and the count query via
//! [`apply_product_filters!`], so the envelope total always matches the
//! predicate set.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageRequest, Paginated};
use uuid::Uuid;

use super::diesel_helpers::{collect_rows, diesel_error_message, pool_error_message};
use super::models::ProductRow;
use super::pool::{DbPool, PoolError};
use super::schema::{brands, categories, product_fitments, products};
use crate::domain::catalog::{Product, ProductFilter, SortKey};
use crate::domain::ports::{ProductsQuery, ProductsQueryError};

/// Diesel-backed implementation of the product read port.
#[derive(Clone)]
pub struct DieselProductsQuery {
    pool: DbPool,
}

impl DieselProductsQuery {
    /// Create a new adapter with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductsQueryError {
    ProductsQueryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: &diesel::result::Error) -> ProductsQueryError {
    ProductsQueryError::query(diesel_error_message(error, "product read"))
}

/// Escape LIKE metacharacters so a search term is matched literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Apply every populated filter field to a boxed products query.
///
/// Written as a macro rather than a generic function because the page query
/// and the count query box to different statement types; boxed `filter`
/// calls return `Self`, so one expansion serves both.
macro_rules! apply_product_filters {
    ($query:ident, $filter:expr) => {{
        let filter = $filter;
        if let Some(term) = filter.term() {
            let pattern = format!("%{}%", escape_like(term));
            let oem_probe = vec![term.trim().to_ascii_uppercase()];
            $query = $query.filter(
                products::name
                    .ilike(pattern.clone())
                    .or(products::sku.ilike(pattern))
                    .or(products::oem_refs.contains(oem_probe)),
            );
        }
        if !filter.brand_slugs().is_empty() {
            let brand_ids = brands::table
                .filter(brands::slug.eq_any(filter.brand_slugs().to_vec()))
                .select(brands::id);
            $query = $query.filter(products::brand_id.eq_any(brand_ids));
        }
        if let Some(category) = filter.category_slug() {
            let category_ids = categories::table
                .filter(categories::slug.eq(category.to_owned()))
                .select(categories::id);
            $query = $query.filter(products::category_id.eq_any(category_ids));
        }
        if let Some(engine_id) = filter.engine_id() {
            let fitted = product_fitments::table
                .filter(product_fitments::engine_id.eq(engine_id))
                .select(product_fitments::product_id);
            $query = $query.filter(products::id.eq_any(fitted));
        }
        if let Some(min) = filter.price_min() {
            $query = $query.filter(products::price_minor.ge(min.minor()));
        }
        if let Some(max) = filter.price_max() {
            $query = $query.filter(products::price_minor.le(max.minor()));
        }
        if filter.is_in_stock_only() {
            $query = $query.filter(products::stock.gt(0));
        }
        $query
    }};
}

#[async_trait]
impl ProductsQuery for DieselProductsQuery {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, ProductsQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count_query = products::table.count().into_boxed();
        count_query = apply_product_filters!(count_query, filter);
        let total: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;

        let mut page_query = products::table
            .select(ProductRow::as_select())
            .into_boxed();
        page_query = apply_product_filters!(page_query, filter);
        // Every sort appends the id as tiebreaker so pages are stable under
        // equal keys.
        page_query = match filter.sort() {
            SortKey::Newest => {
                page_query.order_by((products::created_at.desc(), products::id.asc()))
            }
            SortKey::PriceAsc => {
                page_query.order_by((products::price_minor.asc(), products::id.asc()))
            }
            SortKey::PriceDesc => {
                page_query.order_by((products::price_minor.desc(), products::id.asc()))
            }
            SortKey::Name => page_query.order_by((products::name.asc(), products::id.asc())),
        };
        let rows: Vec<ProductRow> = page_query
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;

        let items = collect_rows(
            rows.into_iter().map(ProductRow::into_domain),
            ProductsQueryError::query,
        )?;
        Ok(Paginated::new(items, page, total))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductsQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProductRow> = products::table
            .filter(products::slug.eq(slug))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(ProductRow::into_domain)
            .transpose()
            .map_err(ProductsQueryError::query)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductsQueryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(ids.to_vec()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        collect_rows(
            rows.into_iter().map(ProductRow::into_domain),
            ProductsQueryError::query,
        )
    }
}

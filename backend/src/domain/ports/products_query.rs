//! Read-side port for product listings and lookups.
//!
//! Inbound adapters consume domain [`Product`] values through this port
//! without coupling to Diesel or any specific data store. The filter type is
//! translated into predicates by the persistence adapter; the port contract
//! is purely "these products match, in this order".

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};
use uuid::Uuid;

use crate::domain::catalog::{Product, ProductFilter};

/// Errors raised when reading products.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductsQueryError {
    /// Repository connection could not be established.
    #[error("product read connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query failed during execution or row conversion.
    #[error("product read query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl ProductsQueryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for reading the product catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductsQuery: Send + Sync {
    /// List products matching `filter`, paginated.
    ///
    /// Unknown brand/category slugs and unknown engine ids yield an empty
    /// page rather than an error; the total reflects the filtered count.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, ProductsQueryError>;

    /// Fetch one product by its URL slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductsQueryError>;

    /// Fetch several products by id, in no particular order.
    ///
    /// Ids without a matching product are silently absent from the result;
    /// callers decide whether that is an error.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductsQueryError>;
}

/// Fixture implementation backed by an in-memory product list.
///
/// Filtering is intentionally minimal (slug and id lookups work; `list`
/// returns everything): handler tests assert wiring and serialisation, not
/// the SQL translation, which has its own adapter tests.
#[derive(Debug, Default, Clone)]
pub struct FixtureProductsQuery {
    products: Vec<Product>,
}

impl FixtureProductsQuery {
    /// Build a fixture serving the given products.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductsQuery for FixtureProductsQuery {
    async fn list(
        &self,
        _filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, ProductsQueryError> {
        let total = i64::try_from(self.products.len()).unwrap_or(i64::MAX);
        Ok(Paginated::new(self.products.clone(), page, total))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductsQueryError> {
        Ok(self
            .products
            .iter()
            .find(|product| product.slug() == slug)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ProductsQueryError> {
        Ok(self
            .products
            .iter()
            .filter(|product| ids.contains(&product.id()))
            .cloned()
            .collect())
    }
}

//! Read-side port for brand and category navigation data.

use async_trait::async_trait;

use crate::domain::catalog::{Brand, Category};

/// Errors raised when reading navigation data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogRepositoryError {
    /// Repository connection could not be established.
    #[error("catalog read connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query failed during execution or row conversion.
    #[error("catalog read query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl CatalogRepositoryError {
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

/// Port for reading brands and categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All part brands, ordered by slug.
    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogRepositoryError>;

    /// All categories (roots and leaves) in one flat list; callers assemble
    /// the navigation tree in the domain.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogRepositoryError>;
}

/// Fixture implementation serving canned navigation data.
#[derive(Debug, Default, Clone)]
pub struct FixtureCatalogRepository {
    brands: Vec<Brand>,
    categories: Vec<Category>,
}

impl FixtureCatalogRepository {
    /// Build a fixture serving the given brands and categories.
    #[must_use]
    pub fn with_data(brands: Vec<Brand>, categories: Vec<Category>) -> Self {
        Self { brands, categories }
    }
}

#[async_trait]
impl CatalogRepository for FixtureCatalogRepository {
    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogRepositoryError> {
        Ok(self.brands.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogRepositoryError> {
        Ok(self.categories.clone())
    }
}

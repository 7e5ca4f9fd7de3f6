//! Product listing filter.
//!
//! The storefront's query-building layer: every listing query parameter maps
//! onto exactly one field here, and the persistence adapter translates each
//! populated field into one SQL predicate. Filters combine with AND across
//! dimensions and OR within the brand set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::Money;

/// Listing sort order. Every variant has a deterministic total order; the
/// persistence layer appends the product id as a tiebreaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently added first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical by display name.
    Name,
}

impl SortKey {
    /// Parse the query-parameter form; unknown values fall back to the
    /// default rather than erroring, matching the storefront's lenient
    /// handling of hand-edited URLs.
    #[must_use]
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "name" => Self::Name,
            _ => Self::Newest,
        }
    }
}

/// Validation failures for filter construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The minimum price bound exceeds the maximum.
    #[error("price range is inverted: min exceeds max")]
    InvertedPriceRange,
}

/// Accumulated listing filter, built from query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    term: Option<String>,
    brand_slugs: Vec<String>,
    category_slug: Option<String>,
    engine_id: Option<Uuid>,
    price_min: Option<Money>,
    price_max: Option<Money>,
    in_stock_only: bool,
    sort: SortKey,
}

impl ProductFilter {
    /// Filter matching the entire catalog.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Free-text search over name, SKU, and OEM references. Blank terms are
    /// treated as absent.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.term = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Restrict to any of the given brand slugs (OR within the set).
    #[must_use]
    pub fn with_brands(mut self, slugs: Vec<String>) -> Self {
        self.brand_slugs = slugs
            .into_iter()
            .map(|slug| slug.trim().to_ascii_lowercase())
            .filter(|slug| !slug.is_empty())
            .collect();
        self
    }

    /// Restrict to one category slug.
    #[must_use]
    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let trimmed = slug.trim();
        self.category_slug = (!trimmed.is_empty()).then(|| trimmed.to_ascii_lowercase());
        self
    }

    /// Restrict to products fitting the given vehicle engine.
    #[must_use]
    pub fn with_engine(mut self, engine_id: Uuid) -> Self {
        self.engine_id = Some(engine_id);
        self
    }

    /// Restrict the price range (inclusive bounds, minor units).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvertedPriceRange`] when both bounds are
    /// present and min exceeds max.
    pub fn with_price_range(
        mut self,
        min: Option<Money>,
        max: Option<Money>,
    ) -> Result<Self, FilterError> {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(FilterError::InvertedPriceRange);
        }
        self.price_min = min;
        self.price_max = max;
        Ok(self)
    }

    /// Exclude items with zero stock.
    #[must_use]
    pub fn in_stock_only(mut self, flag: bool) -> Self {
        self.in_stock_only = flag;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Free-text term, if present.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Brand slug set; empty means unrestricted.
    #[must_use]
    pub fn brand_slugs(&self) -> &[String] {
        &self.brand_slugs
    }

    /// Category slug, if present.
    #[must_use]
    pub fn category_slug(&self) -> Option<&str> {
        self.category_slug.as_deref()
    }

    /// Vehicle engine restriction, if present.
    #[must_use]
    pub fn engine_id(&self) -> Option<Uuid> {
        self.engine_id
    }

    /// Inclusive minimum price bound.
    #[must_use]
    pub fn price_min(&self) -> Option<Money> {
        self.price_min
    }

    /// Inclusive maximum price bound.
    #[must_use]
    pub fn price_max(&self) -> Option<Money> {
        self.price_max
    }

    /// `true` when zero-stock items are excluded.
    #[must_use]
    pub fn is_in_stock_only(&self) -> bool {
        self.in_stock_only
    }

    /// Requested sort order.
    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("price_asc", SortKey::PriceAsc)]
    #[case("price_desc", SortKey::PriceDesc)]
    #[case("name", SortKey::Name)]
    #[case("newest", SortKey::Newest)]
    #[case("garbage", SortKey::Newest)]
    fn sort_key_parses_leniently(#[case] raw: &str, #[case] expected: SortKey) {
        assert_eq!(SortKey::from_param(raw), expected);
    }

    #[test]
    fn blank_terms_are_absent() {
        let filter = ProductFilter::all().with_term("   ");
        assert!(filter.term().is_none());
    }

    #[test]
    fn brand_slugs_are_normalised() {
        let filter = ProductFilter::all().with_brands(vec![
            " Bosch ".to_owned(),
            String::new(),
            "febi".to_owned(),
        ]);
        assert_eq!(filter.brand_slugs(), ["bosch", "febi"]);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let min = Money::from_minor(5_000).expect("fixture");
        let max = Money::from_minor(1_000).expect("fixture");
        let error = ProductFilter::all()
            .with_price_range(Some(min), Some(max))
            .expect_err("inverted range should be rejected");
        assert_eq!(error, FilterError::InvertedPriceRange);
    }

    #[test]
    fn single_bound_ranges_are_accepted() {
        let min = Money::from_minor(1_000).expect("fixture");
        let filter = ProductFilter::all()
            .with_price_range(Some(min), None)
            .expect("open-ended range");
        assert_eq!(filter.price_min(), Some(min));
        assert!(filter.price_max().is_none());
    }
}

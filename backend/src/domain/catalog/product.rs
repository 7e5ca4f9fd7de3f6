//! Product entity: a single purchasable part.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{
    CatalogValidationError, ensure_non_negative, validate_part_code, validate_slug, validate_text,
};
use crate::domain::money::Money;

/// Input payload for [`Product::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Primary key.
    pub id: Uuid,
    /// URL slug, unique across products.
    pub slug: String,
    /// Shop SKU, unique across products.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Manufacturer brand.
    pub brand_id: Uuid,
    /// Leaf category.
    pub category_id: Uuid,
    /// Sale price in minor units.
    pub price: Money,
    /// Optional struck-through reference price.
    pub compare_at: Option<Money>,
    /// Units on hand.
    pub stock: i32,
    /// Gallery image URLs, first is the cover.
    pub image_urls: Vec<String>,
    /// Manufacturer OEM cross-reference numbers.
    pub oem_refs: Vec<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A purchasable part with price, stock, and fitment cross-references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: Uuid,
    slug: String,
    sku: String,
    name: String,
    description: String,
    brand_id: Uuid,
    category_id: Uuid,
    price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    compare_at: Option<Money>,
    stock: i32,
    image_urls: Vec<String>,
    oem_refs: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate and construct a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] when any field violates the
    /// catalog invariants: slug/SKU shape, non-empty name, positive price,
    /// compare-at above price, non-negative stock, valid OEM references.
    pub fn new(draft: ProductDraft) -> Result<Self, CatalogValidationError> {
        Self::try_from(draft)
    }

    /// Primary key.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Shop SKU.
    #[must_use]
    pub fn sku(&self) -> &str {
        self.sku.as_str()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Long-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Manufacturer brand id.
    #[must_use]
    pub fn brand_id(&self) -> Uuid {
        self.brand_id
    }

    /// Leaf category id.
    #[must_use]
    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    /// Sale price.
    #[must_use]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Struck-through reference price, if any.
    #[must_use]
    pub fn compare_at(&self) -> Option<Money> {
        self.compare_at
    }

    /// Units on hand.
    #[must_use]
    pub fn stock(&self) -> i32 {
        self.stock
    }

    /// `true` when at least one unit is available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Gallery image URLs.
    #[must_use]
    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    /// OEM cross-reference numbers.
    #[must_use]
    pub fn oem_refs(&self) -> &[String] {
        &self.oem_refs
    }

    /// Record creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl TryFrom<ProductDraft> for Product {
    type Error = CatalogValidationError;

    fn try_from(draft: ProductDraft) -> Result<Self, Self::Error> {
        if draft.price.is_zero() {
            return Err(CatalogValidationError::OutOfRange {
                field: "product.price",
                message: "must be positive",
            });
        }
        if let Some(compare_at) = draft.compare_at
            && compare_at <= draft.price
        {
            return Err(CatalogValidationError::OutOfRange {
                field: "product.compare_at",
                message: "must exceed the sale price",
            });
        }
        let oem_refs = draft
            .oem_refs
            .into_iter()
            .map(|code| validate_part_code(code, "product.oem_refs"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: draft.id,
            slug: validate_slug(draft.slug, "product.slug")?,
            sku: validate_part_code(draft.sku, "product.sku")?,
            name: validate_text(draft.name, "product.name")?,
            description: draft.description,
            brand_id: draft.brand_id,
            category_id: draft.category_id,
            price: draft.price,
            compare_at: draft.compare_at,
            stock: ensure_non_negative(draft.stock, "product.stock")?,
            image_urls: draft.image_urls,
            oem_refs,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        ProductDraft::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            id: Uuid::new_v4(),
            slug: "brake-pads-front-golf-5".to_owned(),
            sku: "BP-0986-4612".to_owned(),
            name: "Front brake pads".to_owned(),
            description: "Low-dust pads for the front axle.".to_owned(),
            brand_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            price: Money::from_minor(5_990).expect("fixture price"),
            compare_at: None,
            stock: 12,
            image_urls: vec!["https://cdn.example/bp-1.jpg".to_owned()],
            oem_refs: vec!["1K0-698-151".to_owned()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_draft_constructs() {
        let product = Product::new(draft()).expect("valid product");
        assert!(product.in_stock());
        assert_eq!(product.sku(), "BP-0986-4612");
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut d = draft();
        d.price = Money::ZERO;
        let error = Product::new(d).expect_err("zero price should be rejected");
        assert!(matches!(
            error,
            CatalogValidationError::OutOfRange {
                field: "product.price",
                ..
            }
        ));
    }

    #[rstest]
    #[case(5_990)]
    #[case(4_000)]
    fn compare_at_must_exceed_price(#[case] compare_at_minor: i64) {
        let mut d = draft();
        d.compare_at = Some(Money::from_minor(compare_at_minor).expect("fixture"));
        let error = Product::new(d).expect_err("compare-at at or below price should be rejected");
        assert!(matches!(
            error,
            CatalogValidationError::OutOfRange {
                field: "product.compare_at",
                ..
            }
        ));
    }

    #[test]
    fn lowercase_oem_reference_is_rejected() {
        let mut d = draft();
        d.oem_refs = vec!["1k0-698-151".to_owned()];
        let error = Product::new(d).expect_err("lowercase OEM ref should be rejected");
        assert!(matches!(
            error,
            CatalogValidationError::InvalidPartCode {
                field: "product.oem_refs"
            }
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut d = draft();
        d.stock = -3;
        assert!(Product::new(d).is_err());
    }
}

//! Part-manufacturer brand entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{CatalogValidationError, validate_slug, validate_text};

/// Input payload for [`Brand::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDraft {
    /// Primary key.
    pub id: Uuid,
    /// URL slug, e.g. `bosch`.
    pub slug: String,
    /// Display name, e.g. `Bosch`.
    pub name: String,
    /// Optional logo image URL.
    pub logo_url: Option<String>,
    /// Optional country of origin label.
    pub country: Option<String>,
}

/// A parts manufacturer (Bosch, Febi, TRW, …), distinct from vehicle makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    id: Uuid,
    slug: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

impl Brand {
    /// Validate and construct a brand.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] when the slug or name is invalid.
    pub fn new(draft: BrandDraft) -> Result<Self, CatalogValidationError> {
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

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Logo image URL, if one is configured.
    #[must_use]
    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    /// Country of origin label, if known.
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl TryFrom<BrandDraft> for Brand {
    type Error = CatalogValidationError;

    fn try_from(draft: BrandDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            id: draft.id,
            slug: validate_slug(draft.slug, "brand.slug")?,
            name: validate_text(draft.name, "brand.name")?,
            logo_url: draft.logo_url,
            country: draft.country,
        })
    }
}

impl<'de> Deserialize<'de> for Brand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        BrandDraft::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

//! Field validation shared by the catalog entities.

use crate::domain::slug::{is_valid_part_code, is_valid_slug};

/// Validation failure raised by catalog constructors.
///
/// Carries the offending field path so adapters can point clients at the
/// exact input that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogValidationError {
    /// A slug field is empty or contains characters outside `[a-z0-9-]`.
    #[error("{field}: not a valid slug")]
    InvalidSlug {
        /// Dotted path of the rejected field.
        field: &'static str,
    },
    /// A SKU or OEM reference is empty or not uppercase alphanumeric.
    #[error("{field}: not a valid part code")]
    InvalidPartCode {
        /// Dotted path of the rejected field.
        field: &'static str,
    },
    /// A required text field is empty after trimming.
    #[error("{field}: must not be empty")]
    Empty {
        /// Dotted path of the rejected field.
        field: &'static str,
    },
    /// A numeric field is outside its permitted range.
    #[error("{field}: {message}")]
    OutOfRange {
        /// Dotted path of the rejected field.
        field: &'static str,
        /// Short description of the violated bound.
        message: &'static str,
    },
}

/// Validate and return a slug, or the field-tagged error.
pub(crate) fn validate_slug(
    value: String,
    field: &'static str,
) -> Result<String, CatalogValidationError> {
    if is_valid_slug(&value) {
        Ok(value)
    } else {
        Err(CatalogValidationError::InvalidSlug { field })
    }
}

/// Validate and return a SKU/OEM reference, or the field-tagged error.
pub(crate) fn validate_part_code(
    value: String,
    field: &'static str,
) -> Result<String, CatalogValidationError> {
    if is_valid_part_code(&value) {
        Ok(value)
    } else {
        Err(CatalogValidationError::InvalidPartCode { field })
    }
}

/// Validate that a display-text field is non-empty once trimmed.
pub(crate) fn validate_text(
    value: String,
    field: &'static str,
) -> Result<String, CatalogValidationError> {
    if value.trim().is_empty() {
        Err(CatalogValidationError::Empty { field })
    } else {
        Ok(value)
    }
}

/// Validate that a count is non-negative.
pub(crate) fn ensure_non_negative(
    value: i32,
    field: &'static str,
) -> Result<i32, CatalogValidationError> {
    if value < 0 {
        Err(CatalogValidationError::OutOfRange {
            field,
            message: "must not be negative",
        })
    } else {
        Ok(value)
    }
}

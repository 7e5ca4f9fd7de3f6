//! Money as integer minor units.
//!
//! All prices in the shop are Bulgarian lev stored as stotinki (1 lv =
//! 100 st). Integer minor units keep price arithmetic exact and match the
//! relational columns one-to-one; there is no floating point anywhere in the
//! money path.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A non-negative amount of money in stotinki.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

/// Errors raised by money constructors and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// A negative amount was supplied where money must be non-negative.
    #[error("money amounts must not be negative")]
    Negative,
    /// An arithmetic result exceeded the representable range.
    #[error("money arithmetic overflowed")]
    Overflow,
}

impl Money {
    /// Zero stotinki.
    pub const ZERO: Self = Self(0);

    /// Construct from minor units, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for amounts below zero.
    pub fn from_minor(minor: i64) -> Result<Self, MoneyError> {
        if minor < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Self(minor))
    }

    /// The amount in minor units.
    #[must_use]
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] when the sum exceeds `i64::MAX`.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked multiplication by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] when the product exceeds `i64::MAX`.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// `true` when the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    /// Render as lev with two decimal places, e.g. `124.50 lv.`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lev = self.0.div_euclid(100);
        let st = self.0.rem_euclid(100);
        write!(f, "{lev}.{st:02} lv.")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(Money::from_minor(-1), Err(MoneyError::Negative));
    }

    #[rstest]
    #[case(0, "0.00 lv.")]
    #[case(5, "0.05 lv.")]
    #[case(12_450, "124.50 lv.")]
    fn displays_as_lev(#[case] minor: i64, #[case] expected: &str) {
        let money = Money::from_minor(minor).expect("non-negative");
        assert_eq!(money.to_string(), expected);
    }

    #[test]
    fn line_total_multiplies_exactly() {
        let unit = Money::from_minor(1_999).expect("non-negative");
        let total = unit.checked_mul(3).expect("no overflow");
        assert_eq!(total.minor(), 5_997);
    }

    #[test]
    fn arithmetic_overflow_is_reported() {
        let max = Money::from_minor(i64::MAX).expect("non-negative");
        assert_eq!(max.checked_add(max), Err(MoneyError::Overflow));
        assert_eq!(max.checked_mul(2), Err(MoneyError::Overflow));
    }
}

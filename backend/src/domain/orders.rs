//! Orders: lifecycle state machine, pricing, and address validation.
//!
//! An order snapshots the name, SKU, and unit price of every line at
//! checkout time, so later catalog edits never rewrite order history.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom as _;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::customer::EmailAddress;
use super::money::{Money, MoneyError};

/// Flat delivery fee in minor units (6.90 lv).
pub const DELIVERY_FEE_MINOR: i64 = 690;

/// Subtotal at or above which delivery is free (150.00 lv).
pub const FREE_DELIVERY_THRESHOLD_MINOR: i64 = 15_000;

/// Order lifecycle states.
///
/// ```text
/// Pending -> Paid -> Shipped -> Delivered
/// Pending -> Cancelled
/// Paid    -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    Pending,
    /// Payment confirmed.
    Paid,
    /// Handed to the courier.
    Shipped,
    /// Confirmed delivered. Terminal.
    Delivered,
    /// Abandoned or refunded. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Database/text representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the text representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// `true` when no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// `true` when the state machine permits moving to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Paid, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending | Self::Paid, Self::Cancelled)
        )
    }
}

/// Validation failures for order inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// A required address field is empty after trimming.
    #[error("{field}: must not be empty")]
    EmptyField {
        /// Name of the rejected address field.
        field: &'static str,
    },
    /// The phone number contains characters other than digits, `+`, spaces.
    #[error("phone number is not valid")]
    InvalidPhone,
    /// An order must contain at least one line.
    #[error("order has no lines")]
    NoLines,
    /// A line quantity of zero slipped past the cart layer.
    #[error("line quantity must be positive")]
    ZeroQuantity,
    /// Totals exceeded the representable money range.
    #[error("order totals overflowed")]
    TotalOverflow,
}

impl From<MoneyError> for OrderValidationError {
    fn from(_: MoneyError) -> Self {
        Self::TotalOverflow
    }
}

/// Transition failures raised when mutating order state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move order from {from:?} to {to:?}")]
pub struct IllegalTransition {
    /// Current state.
    pub from: OrderStatus,
    /// Rejected target state.
    pub to: OrderStatus,
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient full name.
    pub recipient: String,
    /// Contact phone (digits, `+`, spaces).
    pub phone: String,
    /// City or village.
    pub city: String,
    /// Postal code.
    pub postcode: String,
    /// Street address or courier office.
    pub line1: String,
    /// Optional courier note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ShippingAddress {
    /// Validate raw checkout fields into an address.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError`] naming the first rejected field.
    pub fn try_from_parts(
        recipient: impl Into<String>,
        phone: impl Into<String>,
        city: impl Into<String>,
        postcode: impl Into<String>,
        line1: impl Into<String>,
        note: Option<String>,
    ) -> Result<Self, OrderValidationError> {
        let recipient = non_empty(recipient.into(), "recipient")?;
        let phone = phone.into().trim().to_owned();
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits < 6 || !phone.chars().all(|ch| ch.is_ascii_digit() || ch == '+' || ch == ' ') {
            return Err(OrderValidationError::InvalidPhone);
        }
        Ok(Self {
            recipient,
            phone,
            city: non_empty(city.into(), "city")?,
            postcode: non_empty(postcode.into(), "postcode")?,
            line1: non_empty(line1.into(), "line1")?,
            note: note.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        })
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, OrderValidationError> {
    let trimmed = value.trim().to_owned();
    if trimmed.is_empty() {
        return Err(OrderValidationError::EmptyField { field });
    }
    Ok(trimmed)
}

/// One order line with its catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// The purchased product.
    pub product_id: Uuid,
    /// SKU at checkout time.
    pub sku: String,
    /// Display name at checkout time.
    pub name: String,
    /// Unit price at checkout time.
    pub unit_price: Money,
    /// Units purchased.
    pub quantity: u32,
}

impl OrderLine {
    /// Price of the whole line.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] on arithmetic overflow.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Computed order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Delivery fee after the free-delivery threshold.
    pub delivery: Money,
    /// Grand total.
    pub total: Money,
}

impl OrderTotals {
    /// Price a set of lines: subtotal plus the flat delivery fee, waived at
    /// [`FREE_DELIVERY_THRESHOLD_MINOR`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError::NoLines`], `ZeroQuantity`, or
    /// `TotalOverflow`.
    pub fn for_lines(lines: &[OrderLine]) -> Result<Self, OrderValidationError> {
        if lines.is_empty() {
            return Err(OrderValidationError::NoLines);
        }
        let mut subtotal = Money::ZERO;
        for line in lines {
            if line.quantity == 0 {
                return Err(OrderValidationError::ZeroQuantity);
            }
            subtotal = subtotal.checked_add(line.line_total()?)?;
        }
        let delivery = if subtotal.minor() >= FREE_DELIVERY_THRESHOLD_MINOR {
            Money::ZERO
        } else {
            Money::from_minor(DELIVERY_FEE_MINOR)?
        };
        let total = subtotal.checked_add(delivery)?;
        Ok(Self {
            subtotal,
            delivery,
            total,
        })
    }
}

/// Human-facing order reference, e.g. `CH-7K2M9QARZX`.
///
/// Generated from a Crockford-style alphabet (no `I`, `L`, `O`, `U`) so
/// references survive being read over the phone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

const REFERENCE_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const REFERENCE_LEN: usize = 10;

impl OrderReference {
    /// Generate a fresh reference from the given RNG.
    #[must_use]
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let body: String = (0..REFERENCE_LEN)
            .map(|_| {
                REFERENCE_ALPHABET
                    .choose(rng)
                    .copied()
                    .map_or('X', char::from)
            })
            .collect();
        Self(format!("CH-{body}"))
    }

    /// Accept a client-supplied reference if it has the expected shape.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let body = raw.strip_prefix("CH-")?;
        let shape_ok = body.len() == REFERENCE_LEN
            && body.bytes().all(|b| REFERENCE_ALPHABET.contains(&b));
        shape_ok.then(|| Self(raw.to_owned()))
    }

    /// The reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for OrderReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Primary key.
    pub id: Uuid,
    /// Human-facing reference.
    pub reference: OrderReference,
    /// Owning account; `None` for guest checkout.
    pub customer_id: Option<Uuid>,
    /// Contact email (guest orders are retrieved with it).
    pub email: EmailAddress,
    /// Delivery address.
    pub address: ShippingAddress,
    /// Snapshot lines.
    pub lines: Vec<OrderLine>,
    /// Computed totals.
    pub totals: OrderTotals,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Hosted payment session id, set once checkout created one.
    pub payment_session_id: Option<String>,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Apply a lifecycle transition.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] when the state machine forbids the move.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), IllegalTransition> {
        if !self.status.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(OrderStatus::Pending, OrderStatus::Paid, true)]
    #[case(OrderStatus::Pending, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Paid, OrderStatus::Shipped, true)]
    #[case(OrderStatus::Paid, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
    #[case(OrderStatus::Pending, OrderStatus::Shipped, false)]
    #[case(OrderStatus::Shipped, OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Delivered, OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Cancelled, OrderStatus::Paid, false)]
    fn transition_matrix(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_round_trips_text_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    fn line(unit_minor: i64, quantity: u32) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            sku: "BP-0986-4612".to_owned(),
            name: "Front brake pads".to_owned(),
            unit_price: Money::from_minor(unit_minor).expect("fixture price"),
            quantity,
        }
    }

    #[test]
    fn totals_add_delivery_below_threshold() {
        let totals = OrderTotals::for_lines(&[line(5_990, 2)]).expect("valid lines");
        assert_eq!(totals.subtotal.minor(), 11_980);
        assert_eq!(totals.delivery.minor(), DELIVERY_FEE_MINOR);
        assert_eq!(totals.total.minor(), 12_670);
    }

    #[test]
    fn totals_waive_delivery_at_threshold() {
        let totals = OrderTotals::for_lines(&[line(7_500, 2)]).expect("valid lines");
        assert_eq!(totals.subtotal.minor(), FREE_DELIVERY_THRESHOLD_MINOR);
        assert!(totals.delivery.is_zero());
        assert_eq!(totals.total.minor(), FREE_DELIVERY_THRESHOLD_MINOR);
    }

    #[test]
    fn empty_orders_are_rejected() {
        assert_eq!(
            OrderTotals::for_lines(&[]),
            Err(OrderValidationError::NoLines)
        );
    }

    #[test]
    fn reference_shape_round_trips() {
        let mut rng = SmallRng::seed_from_u64(7);
        let reference = OrderReference::generate(&mut rng);
        assert!(reference.as_str().starts_with("CH-"));
        assert_eq!(
            OrderReference::parse(reference.as_str()),
            Some(reference.clone())
        );
    }

    #[rstest]
    #[case("CH-SHORT")]
    #[case("XX-7K2M9QARZX")]
    #[case("CH-7K2M9QARZI")]
    #[case("ch-7k2m9qarzx")]
    fn malformed_references_are_rejected(#[case] raw: &str) {
        assert!(OrderReference::parse(raw).is_none());
    }

    #[rstest]
    #[case("0888123456", true)]
    #[case("+359 88 812 3456", true)]
    #[case("call me", false)]
    #[case("12345", false)]
    fn phone_validation(#[case] phone: &str, #[case] ok: bool) {
        let result = ShippingAddress::try_from_parts(
            "Ivan Petrov",
            phone,
            "Sofia",
            "1000",
            "bul. Vitosha 1",
            None,
        );
        assert_eq!(result.is_ok(), ok);
    }
}

//! Driving port for cart pricing, checkout, and payment confirmation.
//!
//! HTTP handlers consume the whole cart → order → payment flow through this
//! port; the implementation composes the repository and integration ports in
//! `crate::domain::checkout`.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::customer::EmailAddress;
use crate::domain::error::Error;
use crate::domain::money::Money;
use crate::domain::orders::{Order, OrderReference, OrderStatus, OrderTotals, ShippingAddress};

/// A cart line joined with live catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedCartLine {
    /// The product in the cart.
    pub product_id: Uuid,
    /// Product URL slug for linking back to the detail page.
    pub slug: String,
    /// Current SKU.
    pub sku: String,
    /// Current display name.
    pub name: String,
    /// Current unit price.
    pub unit_price: Money,
    /// Units requested.
    pub quantity: u32,
    /// `unit_price × quantity`.
    pub line_total: Money,
    /// Units currently on hand; below `quantity` means checkout will refuse.
    pub available: i32,
}

/// A fully priced cart view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    /// Priced lines in cart order.
    pub lines: Vec<PricedCartLine>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Delivery fee the order would carry right now.
    pub delivery: Money,
    /// Grand total the order would carry right now.
    pub total: Money,
}

impl CartQuote {
    /// The quote for an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            subtotal: Money::ZERO,
            delivery: Money::ZERO,
            total: Money::ZERO,
        }
    }

    /// Build a quote from priced lines and computed totals.
    #[must_use]
    pub fn from_parts(lines: Vec<PricedCartLine>, totals: OrderTotals) -> Self {
        Self {
            lines,
            subtotal: totals.subtotal,
            delivery: totals.delivery,
            total: totals.total,
        }
    }
}

/// Who is checking out and where the order ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutContact {
    /// Authenticated account, `None` for guest checkout.
    pub customer_id: Option<Uuid>,
    /// Contact email for confirmations and guest order lookup.
    pub email: EmailAddress,
    /// Delivery address.
    pub address: ShippingAddress,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// The created order (status `Pending`).
    pub order: Order,
    /// Hosted payment page the customer must be redirected to.
    pub redirect_url: String,
}

/// Result of processing a payment callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// The order the callback concerned.
    pub reference: OrderReference,
    /// Order status after processing.
    pub status: OrderStatus,
    /// `false` for replays and ignored event types.
    pub acted: bool,
}

/// Domain use-case port for the checkout flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Price the cart against live catalog data.
    async fn quote(&self, cart: &Cart) -> Result<CartQuote, Error>;

    /// Turn the cart into a pending order with reserved stock and an open
    /// payment session.
    async fn place_order(
        &self,
        cart: &Cart,
        contact: CheckoutContact,
    ) -> Result<CheckoutOutcome, Error>;

    /// Verify and apply a payment provider callback.
    async fn handle_callback(
        &self,
        signature: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<CallbackOutcome, Error>;
}

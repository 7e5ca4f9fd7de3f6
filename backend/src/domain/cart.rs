//! Shopping cart held in the session cookie.
//!
//! The cart stores only product ids and quantities; prices and availability
//! are joined in from live catalog data at view and checkout time so a stale
//! cookie can never fix a price. The line cap keeps the serialized cart well
//! inside the ~4 KB cookie budget.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest quantity accepted for a single line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Most distinct lines a cart may hold. Sized so a full cart still fits the
/// session cookie after encryption and base64 expansion.
pub const MAX_CART_LINES: usize = 40;

/// Errors raised by cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Requested quantity is zero (on add) or above [`MAX_LINE_QUANTITY`].
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    QuantityOutOfRange,
    /// The cart already holds [`MAX_CART_LINES`] distinct products.
    #[error("cart is limited to {MAX_CART_LINES} distinct products")]
    TooManyLines,
    /// The referenced product is not in the cart.
    #[error("product is not in the cart")]
    UnknownLine,
}

/// One product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The product being purchased.
    pub product_id: Uuid,
    /// Units requested, `1..=MAX_LINE_QUANTITY`.
    pub quantity: u32,
}

/// The session cart: an ordered list of product lines.
///
/// Insertion order is preserved so the storefront renders lines in the order
/// they were added, matching the behaviour customers expect from the cart
/// page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// `true` when no lines are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Merged quantities saturate at [`MAX_LINE_QUANTITY`] rather than
    /// erroring: repeatedly pressing "add" on the product page should never
    /// bounce the customer.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOutOfRange`] for a zero or over-cap
    /// request, and [`CartError::TooManyLines`] when a new line would exceed
    /// the cart cap.
    pub fn add(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityOutOfRange);
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            return Ok(());
        }
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CartError::TooManyLines);
        }
        self.lines.push(CartLine {
            product_id,
            quantity,
        });
        Ok(())
    }

    /// Set a line's quantity exactly; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] when the product is not in the
    /// cart, or [`CartError::QuantityOutOfRange`] above the cap.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityOutOfRange);
        }
        let index = self
            .lines
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or(CartError::UnknownLine)?;
        if quantity == 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] when the product is not in the
    /// cart.
    pub fn remove(&mut self, product_id: Uuid) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        if self.lines.len() == before {
            return Err(CartError::UnknownLine);
        }
        Ok(())
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn add_merges_existing_lines() {
        let product = Uuid::new_v4();
        let mut cart = Cart::empty();
        cart.add(product, 2).expect("first add");
        cart.add(product, 3).expect("second add");
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn merged_quantity_saturates_at_cap() {
        let product = Uuid::new_v4();
        let mut cart = Cart::empty();
        cart.add(product, 90).expect("first add");
        cart.add(product, 90).expect("saturating add");
        assert_eq!(cart.unit_count(), MAX_LINE_QUANTITY);
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_LINE_QUANTITY + 1)]
    fn add_rejects_out_of_range_quantities(#[case] quantity: u32) {
        let mut cart = Cart::empty();
        let error = cart
            .add(Uuid::new_v4(), quantity)
            .expect_err("quantity should be rejected");
        assert_eq!(error, CartError::QuantityOutOfRange);
    }

    #[test]
    fn line_cap_is_enforced_for_new_products() {
        let mut cart = Cart::empty();
        for _ in 0..MAX_CART_LINES {
            cart.add(Uuid::new_v4(), 1).expect("below the cap");
        }
        let error = cart
            .add(Uuid::new_v4(), 1)
            .expect_err("cap should be enforced");
        assert_eq!(error, CartError::TooManyLines);
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let product = Uuid::new_v4();
        let mut cart = Cart::empty();
        cart.add(product, 2).expect("add");
        cart.set_quantity(product, 0).expect("remove via zero");
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_on_absent_line_is_an_error() {
        let mut cart = Cart::empty();
        let error = cart
            .set_quantity(Uuid::new_v4(), 1)
            .expect_err("absent line");
        assert_eq!(error, CartError::UnknownLine);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut cart = Cart::empty();
        cart.add(first, 1).expect("add first");
        cart.add(second, 1).expect("add second");
        cart.add(first, 1).expect("merge first");
        let order: Vec<Uuid> = cart.lines().iter().map(|line| line.product_id).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn serialized_full_cart_fits_the_cookie_budget() {
        let mut cart = Cart::empty();
        for _ in 0..MAX_CART_LINES {
            cart.add(Uuid::new_v4(), MAX_LINE_QUANTITY).expect("fill");
        }
        let encoded = serde_json::to_string(&cart).expect("serializable");
        assert!(
            encoded.len() < 2_800,
            "full cart must leave headroom for cookie encryption overhead, got {} bytes",
            encoded.len()
        );
    }
}

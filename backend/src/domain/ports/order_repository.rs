//! Persistence port for orders.
//!
//! Order creation and stock reservation are one atomic operation: the
//! adapter must decrement stock with a `stock >= quantity` guard inside the
//! same transaction that inserts the order, and restore stock when a
//! transition cancels it.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::EmailAddress;
use crate::domain::orders::{
    Order, OrderLine, OrderReference, OrderStatus, OrderTotals, ShippingAddress,
};

/// Errors raised by order persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRepositoryError {
    /// Repository connection could not be established.
    #[error("order store connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query failed during execution or row conversion.
    #[error("order store query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
    /// No order carries the given reference.
    #[error("order not found")]
    NotFound,
    /// Stock reservation failed for one of the lines.
    #[error("insufficient stock for {sku}")]
    OutOfStock {
        /// SKU of the line that could not be reserved.
        sku: String,
    },
    /// The requested state change violates the order lifecycle.
    #[error("cannot move order from {from:?} to {to:?}")]
    IllegalTransition {
        /// Current state.
        from: OrderStatus,
        /// Rejected target state.
        to: OrderStatus,
    },
}

impl OrderRepositoryError {
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

    /// Create an out-of-stock error for the given SKU.
    pub fn out_of_stock(sku: impl Into<String>) -> Self {
        Self::OutOfStock { sku: sku.into() }
    }
}

/// Payload for creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Pre-generated human-facing reference.
    pub reference: OrderReference,
    /// Owning account; `None` for guest checkout.
    pub customer_id: Option<Uuid>,
    /// Contact email.
    pub email: EmailAddress,
    /// Delivery address.
    pub address: ShippingAddress,
    /// Snapshot lines, at least one.
    pub lines: Vec<OrderLine>,
    /// Pre-computed totals.
    pub totals: OrderTotals,
}

/// Result of a lifecycle transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The order after the request.
    pub order: Order,
    /// `false` when the order was already in the requested state (replayed
    /// payment callbacks land here).
    pub changed: bool,
}

/// Port for storing and mutating orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and reserve stock for every line atomically.
    ///
    /// Fails with [`OrderRepositoryError::OutOfStock`] when any line cannot
    /// be reserved; in that case nothing is persisted.
    async fn create(&self, new_order: NewOrder) -> Result<Order, OrderRepositoryError>;

    /// Record the hosted payment session created for an order.
    async fn set_payment_session(
        &self,
        reference: &OrderReference,
        session_id: &str,
    ) -> Result<(), OrderRepositoryError>;

    /// Fetch one order by reference.
    async fn find_by_reference(
        &self,
        reference: &OrderReference,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// All orders of one customer, newest first.
    async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Apply a lifecycle transition.
    ///
    /// Requesting the state the order is already in is a no-op with
    /// `changed = false`. Transitioning to [`OrderStatus::Cancelled`]
    /// restores the reserved stock.
    async fn transition(
        &self,
        reference: &OrderReference,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, OrderRepositoryError>;
}

/// In-memory order store for wiring tests. No stock bookkeeping.
#[derive(Debug, Default)]
pub struct FixtureOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl FixtureOrderRepository {
    fn with_orders<T>(&self, f: impl FnOnce(&mut Vec<Order>) -> T) -> T {
        let mut guard = self
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, OrderRepositoryError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            reference: new_order.reference,
            customer_id: new_order.customer_id,
            email: new_order.email,
            address: new_order.address,
            lines: new_order.lines,
            totals: new_order.totals,
            status: OrderStatus::Pending,
            payment_session_id: None,
            created_at: now,
            updated_at: now,
        };
        self.with_orders(|orders| orders.push(order.clone()));
        Ok(order)
    }

    async fn set_payment_session(
        &self,
        reference: &OrderReference,
        session_id: &str,
    ) -> Result<(), OrderRepositoryError> {
        self.with_orders(|orders| {
            let order = orders
                .iter_mut()
                .find(|order| &order.reference == reference)
                .ok_or(OrderRepositoryError::NotFound)?;
            order.payment_session_id = Some(session_id.to_owned());
            Ok(())
        })
    }

    async fn find_by_reference(
        &self,
        reference: &OrderReference,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.with_orders(|orders| {
            orders
                .iter()
                .find(|order| &order.reference == reference)
                .cloned()
        }))
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut mine: Vec<Order> = self.with_orders(|orders| {
            orders
                .iter()
                .filter(|order| order.customer_id == Some(customer_id))
                .cloned()
                .collect()
        });
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn transition(
        &self,
        reference: &OrderReference,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, OrderRepositoryError> {
        self.with_orders(|orders| {
            let order = orders
                .iter_mut()
                .find(|order| &order.reference == reference)
                .ok_or(OrderRepositoryError::NotFound)?;
            if order.status == next {
                return Ok(TransitionOutcome {
                    order: order.clone(),
                    changed: false,
                });
            }
            order
                .transition_to(next)
                .map_err(|err| OrderRepositoryError::IllegalTransition {
                    from: err.from,
                    to: err.to,
                })?;
            Ok(TransitionOutcome {
                order: order.clone(),
                changed: true,
            })
        })
    }
}

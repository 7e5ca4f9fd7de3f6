//! Outbound port for ops notifications about order activity.
//!
//! The shop team follows incoming orders in a chat channel; this port posts
//! short summaries there. Strictly fire-and-forget: a missed notification is
//! a logging matter, never a request failure.

use async_trait::async_trait;

use crate::domain::orders::Order;

/// Errors raised when posting a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The webhook endpoint did not answer within the configured timeout.
    #[error("notification timed out: {message}")]
    Timeout {
        /// Underlying failure description.
        message: String,
    },
    /// Connection or protocol failure below HTTP semantics.
    #[error("notification transport failed: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The webhook endpoint refused the payload.
    #[error("notification rejected: {message}")]
    Rejected {
        /// Underlying failure description.
        message: String,
    },
}

impl NotifyError {
    /// Create a timeout error with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for posting order activity to the ops channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Announce a freshly placed order.
    async fn order_placed(&self, order: &Order) -> Result<(), NotifyError>;

    /// Announce a confirmed payment.
    async fn order_paid(&self, order: &Order) -> Result<(), NotifyError>;
}

/// No-op notifier for wiring tests and unconfigured deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderNotifier;

#[async_trait]
impl OrderNotifier for FixtureOrderNotifier {
    async fn order_placed(&self, _order: &Order) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn order_paid(&self, _order: &Order) -> Result<(), NotifyError> {
        Ok(())
    }
}

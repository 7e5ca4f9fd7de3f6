//! Outbound port for transactional email.

use async_trait::async_trait;

use crate::domain::customer::EmailAddress;

/// Errors raised when sending email.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// The provider did not answer within the configured timeout.
    #[error("mail provider timed out: {message}")]
    Timeout {
        /// Underlying failure description.
        message: String,
    },
    /// Connection or protocol failure below HTTP semantics.
    #[error("mail transport failed: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The provider refused the message.
    #[error("mail provider rejected the message: {message}")]
    Rejected {
        /// Underlying failure description.
        message: String,
    },
}

impl MailError {
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

/// A plain-text transactional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

/// Port for the transactional email provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send one message.
    ///
    /// Callers in the checkout path treat failures as log-and-continue: a
    /// missed confirmation email must never fail a paid order.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// No-op sender for wiring tests and pool-less deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailSender;

#[async_trait]
impl MailSender for FixtureMailSender {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Ok(())
    }
}

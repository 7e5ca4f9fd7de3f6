//! Outbound port for the hosted payment provider.
//!
//! The shop never touches card data: checkout creates a hosted session and
//! redirects the customer to the provider; the provider reports the outcome
//! through a signed callback which the adapter verifies before the event
//! reaches the domain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::customer::EmailAddress;
use crate::domain::money::Money;
use crate::domain::orders::OrderReference;

/// Errors raised when talking to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentGatewayError {
    /// The provider did not answer within the configured timeout.
    #[error("payment provider timed out: {message}")]
    Timeout {
        /// Underlying failure description.
        message: String,
    },
    /// Connection or protocol failure below HTTP semantics.
    #[error("payment provider transport failed: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The provider rejected the session request.
    #[error("payment provider rejected the request: {message}")]
    Rejected {
        /// Underlying failure description.
        message: String,
    },
    /// The provider answered but the payload did not decode.
    #[error("payment provider response malformed: {message}")]
    Decode {
        /// Underlying failure description.
        message: String,
    },
}

impl PaymentGatewayError {
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

    /// Create a decode error with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Errors raised when verifying a provider callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// The signature header does not match the payload.
    #[error("callback signature is invalid")]
    InvalidSignature,
    /// The timestamp header is missing, unparsable, or outside tolerance.
    #[error("callback timestamp is stale or malformed")]
    StaleTimestamp,
    /// The payload is not a recognised event document.
    #[error("callback payload is malformed: {message}")]
    Malformed {
        /// Underlying failure description.
        message: String,
    },
}

impl CallbackError {
    /// Create a malformed-payload error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSessionRequest {
    /// Order being paid for.
    pub reference: OrderReference,
    /// Amount to charge.
    pub amount: Money,
    /// Customer contact email, shown on the hosted page.
    pub email: EmailAddress,
}

/// An open hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// Provider-side session id.
    pub id: String,
    /// URL the customer is redirected to.
    pub redirect_url: String,
}

/// Payment outcome reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventKind {
    /// The customer paid.
    Completed,
    /// The session failed or expired.
    Failed,
    /// An event type this shop does not act on.
    Ignored,
}

/// A verified provider callback event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    /// What happened.
    pub kind: PaymentEventKind,
    /// The order the event concerns.
    pub reference: OrderReference,
    /// Provider session id, for audit logging.
    pub session_id: String,
}

/// Port for the hosted payment provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session for an order.
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError>;

    /// Verify a callback's signature and timestamp, then parse the event.
    ///
    /// Verification happens before parsing so a forged payload is rejected
    /// without being interpreted.
    fn parse_callback(
        &self,
        signature: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<PaymentEvent, CallbackError>;
}

/// Signature accepted by [`FixturePaymentGateway::parse_callback`].
pub const FIXTURE_SIGNATURE: &str = "fixture-valid";

/// Fixture gateway for wiring tests: sessions are canned and callbacks are
/// accepted when signed with [`FIXTURE_SIGNATURE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

/// Callback body shape shared with the real adapter.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CallbackBody {
    /// Event type, e.g. `payment.completed`.
    pub event: String,
    /// Order reference the event concerns.
    pub reference: String,
    /// Provider session id.
    pub session_id: String,
}

/// Map a callback body onto a domain event. Shared with the real adapter.
pub(crate) fn event_from_body(body: &[u8]) -> Result<PaymentEvent, CallbackError> {
    let parsed: CallbackBody =
        serde_json::from_slice(body).map_err(|err| CallbackError::malformed(err.to_string()))?;
    let reference = OrderReference::parse(&parsed.reference)
        .ok_or_else(|| CallbackError::malformed("unrecognised order reference"))?;
    let kind = match parsed.event.as_str() {
        "payment.completed" => PaymentEventKind::Completed,
        "payment.failed" => PaymentEventKind::Failed,
        _ => PaymentEventKind::Ignored,
    };
    Ok(PaymentEvent {
        kind,
        reference,
        session_id: parsed.session_id,
    })
}

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError> {
        let id = format!("ps_{}", request.reference.as_str());
        Ok(PaymentSession {
            redirect_url: format!("https://pay.example/session/{id}"),
            id,
        })
    }

    fn parse_callback(
        &self,
        signature: &str,
        _timestamp: &str,
        body: &[u8],
    ) -> Result<PaymentEvent, CallbackError> {
        if signature != FIXTURE_SIGNATURE {
            return Err(CallbackError::InvalidSignature);
        }
        event_from_body(body)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("payment.completed", PaymentEventKind::Completed)]
    #[case("payment.failed", PaymentEventKind::Failed)]
    #[case("payment.refund.created", PaymentEventKind::Ignored)]
    fn event_kinds_map_from_body(#[case] event: &str, #[case] expected: PaymentEventKind) {
        let body = serde_json::json!({
            "event": event,
            "reference": "CH-7K2M9QARZX",
            "sessionId": "ps_1",
        });
        let event = event_from_body(body.to_string().as_bytes()).expect("valid body");
        assert_eq!(event.kind, expected);
    }

    #[test]
    fn malformed_reference_is_rejected() {
        let body = serde_json::json!({
            "event": "payment.completed",
            "reference": "not-a-reference",
            "sessionId": "ps_1",
        });
        let error = event_from_body(body.to_string().as_bytes()).expect_err("bad reference");
        assert!(matches!(error, CallbackError::Malformed { .. }));
    }

    #[test]
    fn fixture_rejects_unknown_signatures() {
        let error = FixturePaymentGateway
            .parse_callback("forged", "0", b"{}")
            .expect_err("forged signature");
        assert_eq!(error, CallbackError::InvalidSignature);
    }
}

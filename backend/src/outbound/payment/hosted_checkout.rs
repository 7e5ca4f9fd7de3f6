//! Reqwest-backed hosted checkout adapter.
//!
//! Owns transport details only: session creation over HTTPS form POST,
//! timeout and status mapping, and callback verification. The callback
//! signature is the hex SHA-256 digest of `secret ‖ timestamp ‖ body`,
//! compared in constant time, with a ±5 minute timestamp tolerance.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};

use crate::domain::ports::{
    CallbackError, PaymentEvent, PaymentGateway, PaymentGatewayError, PaymentSession,
    PaymentSessionRequest, event_from_body,
};

/// Accepted clock skew between the provider and the shop.
const TIMESTAMP_TOLERANCE_SECONDS: i64 = 300;

/// Connection settings for the hosted checkout provider.
#[derive(Debug, Clone)]
pub struct HostedCheckoutConfig {
    /// Session creation endpoint.
    pub endpoint: Url,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Shared secret signing callbacks.
    pub callback_secret: String,
    /// Request timeout.
    pub timeout: Duration,
}

/// Hosted checkout adapter performing HTTPS calls against one provider.
pub struct HostedCheckoutGateway {
    client: Client,
    endpoint: Url,
    api_key: String,
    callback_secret: String,
}

impl HostedCheckoutGateway {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HostedCheckoutConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            callback_secret: config.callback_secret,
        })
    }

    fn expected_signature(&self, timestamp: &str, body: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.callback_secret.as_bytes());
        hasher.update(timestamp.as_bytes());
        hasher.update(body);
        hex::encode(hasher.finalize())
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0_u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn map_transport_error(error: &reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ if status.is_client_error() => PaymentGatewayError::rejected(message),
        _ => PaymentGatewayError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Provider response for a created session.
#[derive(Debug, Deserialize)]
struct SessionDto {
    id: String,
    url: String,
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError> {
        let amount = request.amount.minor().to_string();
        let form = [
            ("reference", request.reference.as_str()),
            ("amount_minor", amount.as_str()),
            ("currency", "BGN"),
            ("customer_email", request.email.as_str()),
        ];
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let session: SessionDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| PaymentGatewayError::decode(err.to_string()))?;
        Ok(PaymentSession {
            id: session.id,
            redirect_url: session.url,
        })
    }

    fn parse_callback(
        &self,
        signature: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<PaymentEvent, CallbackError> {
        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| CallbackError::StaleTimestamp)?;
        let skew = (Utc::now().timestamp() - sent_at).abs();
        if skew > TIMESTAMP_TOLERANCE_SECONDS {
            return Err(CallbackError::StaleTimestamp);
        }

        let expected = self.expected_signature(timestamp, body);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(CallbackError::InvalidSignature);
        }
        event_from_body(body)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::PaymentEventKind;

    fn gateway() -> HostedCheckoutGateway {
        HostedCheckoutGateway::new(HostedCheckoutConfig {
            endpoint: Url::parse("https://pay.example/v1/sessions").expect("fixture url"),
            api_key: "sk_test".to_owned(),
            callback_secret: "whsec_test".to_owned(),
            timeout: Duration::from_secs(10),
        })
        .expect("client builds")
    }

    fn signed_body() -> (String, String, Vec<u8>) {
        let body = serde_json::json!({
            "event": "payment.completed",
            "reference": "CH-7K2M9QARZX",
            "sessionId": "ps_1",
        })
        .to_string()
        .into_bytes();
        let timestamp = Utc::now().timestamp().to_string();
        let gateway = gateway();
        let signature = gateway.expected_signature(&timestamp, &body);
        (signature, timestamp, body)
    }

    #[test]
    fn valid_signature_yields_the_event() {
        let (signature, timestamp, body) = signed_body();
        let event = gateway()
            .parse_callback(&signature, &timestamp, &body)
            .expect("valid callback");
        assert_eq!(event.kind, PaymentEventKind::Completed);
        assert_eq!(event.session_id, "ps_1");
    }

    #[test]
    fn tampered_body_is_rejected() {
        let (signature, timestamp, _) = signed_body();
        let error = gateway()
            .parse_callback(&signature, &timestamp, b"{\"event\":\"payment.completed\"}")
            .expect_err("tampered body");
        assert_eq!(error, CallbackError::InvalidSignature);
    }

    #[rstest]
    #[case::not_a_number("yesterday")]
    #[case::too_old("100")]
    fn bad_timestamps_are_rejected(#[case] timestamp: &str) {
        let (signature, _, body) = signed_body();
        let error = gateway()
            .parse_callback(&signature, timestamp, &body)
            .expect_err("stale timestamp");
        assert_eq!(error, CallbackError::StaleTimestamp);
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, "Rejected")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"error\":\"nope\"}");
        let matched = match expected {
            "Rejected" => matches!(error, PaymentGatewayError::Rejected { .. }),
            "Timeout" => matches!(error, PaymentGatewayError::Timeout { .. }),
            _ => matches!(error, PaymentGatewayError::Transport { .. }),
        };
        assert!(matched, "unexpected mapping: {error:?}");
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
    }
}

//! Reqwest-backed transactional email adapter.
//!
//! Sends plain-text messages through the provider's JSON API with a bearer
//! key. Transport, timeout, and status failures map onto the mail port's
//! error taxonomy; callers in the checkout path log and continue.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ports::{MailError, MailSender, OutgoingEmail};

/// Connection settings for the email provider.
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    /// Send endpoint.
    pub endpoint: Url,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Sender address, e.g. `orders@chasti.example`.
    pub from: String,
    /// Request timeout.
    pub timeout: Duration,
}

/// Email adapter performing JSON POSTs against one provider.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HttpMailerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            from: config.from,
        })
    }
}

/// Provider send request body.
#[derive(Debug, Serialize)]
struct SendDto<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

fn map_transport_error(error: &reqwest::Error) -> MailError {
    if error.is_timeout() {
        MailError::timeout(error.to_string())
    } else {
        MailError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> MailError {
    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => MailError::timeout(message),
        _ if status.is_client_error() => MailError::rejected(message),
        _ => MailError::transport(message),
    }
}

#[async_trait]
impl MailSender for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let payload = SendDto {
            from: &self.from,
            to: email.to.as_str(),
            subject: &email.subject,
            text: &email.text,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, "Rejected")]
    #[case(StatusCode::UNAUTHORIZED, "Rejected")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case(StatusCode::BAD_GATEWAY, "Transport")]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status);
        let matched = match expected {
            "Rejected" => matches!(error, MailError::Rejected { .. }),
            "Timeout" => matches!(error, MailError::Timeout { .. }),
            _ => matches!(error, MailError::Transport { .. }),
        };
        assert!(matched, "unexpected mapping: {error:?}");
    }
}

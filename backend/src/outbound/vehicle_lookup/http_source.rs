//! Reqwest-backed VIN decode adapter for the public vehicle-data API.
//!
//! Owns transport details only: URL construction, timeout and HTTP status
//! mapping, and JSON decoding into domain candidates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::DecodeResponseDto;
use crate::domain::ports::{VehicleLookup, VehicleLookupError};
use crate::domain::vehicles::{VinCandidate, is_plausible_vin};

const DEFAULT_USER_AGENT: &str = "chasti-backend-vin-lookup/0.1";

/// Connection settings for the decode service.
#[derive(Debug, Clone)]
pub struct VinLookupConfig {
    /// API base, e.g. `https://vpic.nhtsa.dot.gov/api/`.
    pub base_url: Url,
    /// Request timeout.
    pub timeout: Duration,
}

/// VIN decode adapter performing GET requests against one endpoint.
pub struct HttpVinLookup {
    client: Client,
    base_url: Url,
}

impl HttpVinLookup {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: VinLookupConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn decode_url(&self, vin: &str) -> Result<Url, VehicleLookupError> {
        let path = format!("vehicles/DecodeVinValues/{vin}");
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|err| VehicleLookupError::invalid_vin(err.to_string()))?;
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }
}

fn map_transport_error(error: &reqwest::Error) -> VehicleLookupError {
    if error.is_timeout() {
        VehicleLookupError::timeout(error.to_string())
    } else {
        VehicleLookupError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> VehicleLookupError {
    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            VehicleLookupError::timeout(message)
        }
        _ if status.is_client_error() => VehicleLookupError::invalid_vin(message),
        _ => VehicleLookupError::transport(message),
    }
}

#[async_trait]
impl VehicleLookup for HttpVinLookup {
    async fn decode_vin(&self, vin: &str) -> Result<Vec<VinCandidate>, VehicleLookupError> {
        if !is_plausible_vin(vin) {
            return Err(VehicleLookupError::invalid_vin(
                "VIN must be 17 characters without I, O, or Q",
            ));
        }
        let url = self.decode_url(vin)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err))?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let decoded: DecodeResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| VehicleLookupError::decode(format!("invalid decode payload: {err}")))?;
        Ok(decoded.into_candidates())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn lookup() -> HttpVinLookup {
        HttpVinLookup::new(VinLookupConfig {
            base_url: Url::parse("https://vpic.nhtsa.dot.gov/api/").expect("fixture url"),
            timeout: Duration::from_secs(10),
        })
        .expect("client builds")
    }

    #[test]
    fn decode_url_embeds_vin_and_format() {
        let url = lookup()
            .decode_url("WVWZZZ1KZ6W000001")
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://vpic.nhtsa.dot.gov/api/vehicles/DecodeVinValues/WVWZZZ1KZ6W000001?format=json"
        );
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, "InvalidVin")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case(StatusCode::BAD_GATEWAY, "Transport")]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status);
        let matched = match expected {
            "InvalidVin" => matches!(error, VehicleLookupError::InvalidVin { .. }),
            "Timeout" => matches!(error, VehicleLookupError::Timeout { .. }),
            _ => matches!(error, VehicleLookupError::Transport { .. }),
        };
        assert!(matched, "unexpected mapping: {error:?}");
    }
}

//! Outbound port for the public vehicle-data decode API.
//!
//! The storefront offers "find parts by VIN": the VIN is decoded by an
//! external public API into make/model/year candidates which the client then
//! matches against the local fitment hierarchy.

use async_trait::async_trait;

use crate::domain::vehicles::VinCandidate;

/// Errors raised by the external decode service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleLookupError {
    /// The VIN failed the basic shape check; no request was made.
    #[error("VIN is not plausible: {message}")]
    InvalidVin {
        /// What was wrong with the input.
        message: String,
    },
    /// The service did not answer within the configured timeout.
    #[error("vehicle lookup timed out: {message}")]
    Timeout {
        /// Underlying failure description.
        message: String,
    },
    /// Connection or protocol failure below HTTP semantics.
    #[error("vehicle lookup transport failed: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The service answered but the payload did not decode.
    #[error("vehicle lookup response malformed: {message}")]
    Decode {
        /// Underlying failure description.
        message: String,
    },
}

impl VehicleLookupError {
    /// Create an invalid-VIN error with the given message.
    pub fn invalid_vin(message: impl Into<String>) -> Self {
        Self::InvalidVin {
            message: message.into(),
        }
    }

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

    /// Create a decode error with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for decoding a VIN into vehicle candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    /// Decode `vin` into zero or more candidates.
    ///
    /// An unrecognised but well-formed VIN yields an empty list, not an
    /// error.
    async fn decode_vin(&self, vin: &str) -> Result<Vec<VinCandidate>, VehicleLookupError>;
}

/// Fixture implementation returning one canned candidate for any VIN.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVehicleLookup;

#[async_trait]
impl VehicleLookup for FixtureVehicleLookup {
    async fn decode_vin(&self, _vin: &str) -> Result<Vec<VinCandidate>, VehicleLookupError> {
        Ok(vec![VinCandidate {
            make: "VOLKSWAGEN".to_owned(),
            model: "Golf".to_owned(),
            model_year: Some(2006),
            engine: Some("2.0 TDI".to_owned()),
        }])
    }
}

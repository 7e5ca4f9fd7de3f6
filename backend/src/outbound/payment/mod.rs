//! Hosted payment provider adapter.

mod hosted_checkout;

pub use hosted_checkout::{HostedCheckoutConfig, HostedCheckoutGateway};

//! Domain layer: entities, value objects, ports, and use-case services.
//!
//! Types here are transport and storage agnostic. Inbound adapters map them
//! to HTTP; outbound adapters map them to SQL rows and provider payloads.
//! Entities validate on construction so invalid state never crosses this
//! boundary.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod error;
pub mod money;
pub mod orders;
pub mod ports;
mod slug;
pub mod trace_id;
pub mod vehicles;

pub use self::checkout::CheckoutServiceImpl;
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;

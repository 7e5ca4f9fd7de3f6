//! External VIN decode adapter.

mod dto;
mod http_source;

pub use http_source::{HttpVinLookup, VinLookupConfig};

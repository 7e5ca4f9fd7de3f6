//! Inbound adapters: everything that drives the domain from outside.

pub mod http;

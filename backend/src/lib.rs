//! Storefront backend for the Chasti auto-parts shop.
//!
//! A JSON HTTP API over PostgreSQL with a session-cookie cart, a checkout
//! and order lifecycle, and outbound integrations: hosted payment checkout,
//! transactional email, a public vehicle-data VIN decoder, and an ops chat
//! webhook.
//!
//! The crate is laid out hexagonally:
//! - [`domain`] — entities, ports, and use-case services;
//! - [`inbound`] — the actix-web REST adapter;
//! - [`outbound`] — Diesel persistence and reqwest integration adapters;
//! - [`middleware`] — request tracing shared by every route.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use doc::ApiDoc;
pub use middleware::Trace;

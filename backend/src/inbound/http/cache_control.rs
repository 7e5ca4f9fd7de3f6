//! Cache-control headers for storefront responses.
//!
//! Catalog listings are the same for everyone and tolerate a minute of
//! staleness; anything involving the session or an order must never be
//! cached by intermediaries.

/// Header for public catalog reads (products, brands, categories, vehicles).
#[must_use]
pub fn public_listing_header() -> (&'static str, &'static str) {
    ("Cache-Control", "public, max-age=60")
}

/// Header for per-session and per-account responses.
#[must_use]
pub fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", "private, no-store")
}

//! Pagination primitives shared by storefront listing endpoints.
//!
//! Listing endpoints accept either an explicit `page`/`per_page` pair or an
//! opaque continuation token minted by a previous response. Both forms
//! normalise into a [`PageRequest`]; responses wrap their items in a
//! [`Paginated`] envelope that carries the token for the next page, if any.
//!
//! Tokens are deliberately opaque (URL-safe base64 over a JSON payload) so
//! clients cannot construct or increment them by hand and the encoding can
//! change without breaking the API contract.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use url::Url;

/// Largest permitted page size; requests above this are clamped, not refused.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size applied when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Errors raised when decoding a continuation token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is not valid URL-safe base64.
    #[error("continuation token is not valid base64")]
    InvalidEncoding,
    /// The token decoded but its payload is not a page descriptor.
    #[error("continuation token payload is malformed")]
    InvalidPayload,
}

/// Normalised page request: a 1-based page number and a clamped page size.
///
/// Construction never fails; out-of-range values are clamped so that a
/// hand-edited query string degrades gracefully instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request from raw client input, clamping both fields.
    ///
    /// `page` 0 becomes 1; `per_page` is clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Build a request from optional query parameters, falling back to the
    /// defaults for absent values.
    #[must_use]
    pub fn from_params(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Clamped page size.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// SQL `OFFSET` for this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// The request describing the page after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            per_page: self.per_page,
        }
    }
}

/// Wire payload behind a continuation token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    page: u32,
    per_page: u32,
}

/// Opaque continuation token identifying the next page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Mint a token for the given page request.
    #[must_use]
    pub fn for_request(request: PageRequest) -> Self {
        let payload = TokenPayload {
            page: request.page(),
            per_page: request.per_page(),
        };
        // Serialising two integers cannot fail; fall back to an empty object
        // rather than panicking if serde_json ever changes that contract.
        let bytes = serde_json::to_vec(&payload).unwrap_or_else(|_| b"{}".to_vec());
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode a client-supplied token back into a page request.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the token is not base64 or its payload
    /// does not describe a page. Decoded values are clamped exactly like
    /// explicit parameters.
    pub fn decode(raw: &str) -> Result<PageRequest, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| TokenError::InvalidEncoding)?;
        let payload: TokenPayload =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidPayload)?;
        Ok(PageRequest::new(payload.page, payload.per_page))
    }

    /// The encoded token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing envelope returned by paginated endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page, in listing order.
    pub items: Vec<T>,
    /// 1-based page number that produced this envelope.
    pub page: u32,
    /// Page size that produced this envelope.
    pub per_page: u32,
    /// Total matching items across all pages.
    pub total: i64,
    /// Token for the next page; absent on the final page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<ContinuationToken>,
}

impl<T> Paginated<T> {
    /// Assemble an envelope, minting a continuation token when more items
    /// remain beyond this page.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let consumed = i64::from(request.page()) * i64::from(request.per_page());
        let next = (consumed < total).then(|| ContinuationToken::for_request(request.next()));
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
            next,
        }
    }

    /// Map the item type while keeping the envelope metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            next: self.next,
        }
    }
}

/// Append a continuation token to a listing URL as the `cursor` parameter.
///
/// Any existing `cursor` parameter is replaced so tokens never accumulate
/// when clients follow `next` links repeatedly.
#[must_use]
pub fn with_cursor(base: &Url, token: &ContinuationToken) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != "cursor")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (name, value) in &retained {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("cursor", token.as_str());
    }
    url
}

#[cfg(test)]
mod tests {
    //! Regression coverage for clamping, token round-trips, and envelopes.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, 1, 1)]
    #[case(1, 24, 1, 24)]
    #[case(3, 500, 3, MAX_PER_PAGE)]
    #[case(7, 1, 7, 1)]
    fn page_request_clamps_raw_input(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[test]
    fn page_request_defaults_apply_for_absent_params() {
        let request = PageRequest::from_params(None, None);
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
    }

    #[rstest]
    #[case(1, 24, 0)]
    #[case(2, 24, 24)]
    #[case(5, 10, 40)]
    fn offset_reflects_page_and_size(#[case] page: u32, #[case] per_page: u32, #[case] offset: i64) {
        assert_eq!(PageRequest::new(page, per_page).offset(), offset);
    }

    #[test]
    fn token_round_trips_page_request() {
        let request = PageRequest::new(4, 48);
        let token = ContinuationToken::for_request(request);
        let decoded = ContinuationToken::decode(token.as_str()).expect("token should decode");
        assert_eq!(decoded, request);
    }

    #[rstest]
    #[case::not_base64("%%%not-base64%%%", TokenError::InvalidEncoding)]
    #[case::wrong_payload("bm90LWpzb24", TokenError::InvalidPayload)]
    fn tampered_tokens_are_rejected(#[case] raw: &str, #[case] expected: TokenError) {
        let error = ContinuationToken::decode(raw).expect_err("token should be rejected");
        assert_eq!(error, expected);
    }

    #[test]
    fn envelope_mints_next_token_while_items_remain() {
        let request = PageRequest::new(1, 2);
        let envelope = Paginated::new(vec!["a", "b"], request, 5);
        let next = envelope.next.expect("next token should be present");
        let decoded = ContinuationToken::decode(next.as_str()).expect("token should decode");
        assert_eq!(decoded, PageRequest::new(2, 2));
    }

    #[test]
    fn envelope_omits_next_token_on_final_page() {
        let request = PageRequest::new(3, 2);
        let envelope = Paginated::new(vec!["e"], request, 5);
        assert!(envelope.next.is_none());
    }

    #[test]
    fn envelope_map_preserves_metadata() {
        let envelope = Paginated::new(vec![1_i32, 2], PageRequest::new(1, 2), 4).map(|n| n * 10);
        assert_eq!(envelope.items, vec![10, 20]);
        assert_eq!(envelope.total, 4);
        assert!(envelope.next.is_some());
    }

    #[test]
    fn with_cursor_replaces_existing_cursor_parameter() {
        let base = Url::parse("https://shop.example/api/v1/products?brand=bosch&cursor=old")
            .expect("fixture url");
        let token = ContinuationToken::for_request(PageRequest::new(2, 24));
        let next = with_cursor(&base, &token);
        let cursors: Vec<(String, String)> = next
            .query_pairs()
            .filter(|(name, _)| name == "cursor")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(cursors.len(), 1);
        assert_eq!(
            cursors.first().map(|(_, value)| value.as_str()),
            Some(token.as_str())
        );
        assert!(
            next.query_pairs()
                .any(|(name, value)| name == "brand" && value == "bosch"),
            "unrelated parameters should be retained"
        );
    }
}

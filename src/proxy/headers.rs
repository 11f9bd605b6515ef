//! Header utilities for upstream proxying
//!
//! Only an allow-list of caller headers reaches the upstream, and only
//! end-to-end headers come back from it.

use axum::http::header::{self, HeaderName};
use reqwest::header::{HeaderMap, HeaderValue};

/// Browser User-Agent sent upstream when the caller's own is not forwarded
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default content type for proxied audio streams
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Default content type for proxied cover art
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Default cache directive for proxied cover art
pub const DEFAULT_IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

/// Caller headers copied onto the upstream request
const FORWARDED_HEADERS: &[HeaderName] = &[header::RANGE, header::ACCEPT];

/// Upstream headers copied onto a proxied media stream
pub const STREAM_HEADERS: &[HeaderName] = &[
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
];

/// Hop-by-hop headers that must never be forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Build the header set for an upstream request
///
/// `range` and `accept` are copied from the caller. The caller's User-Agent is
/// used only when `forward_user_agent` is set and one was sent; otherwise the
/// fixed browser User-Agent is substituted.
pub fn build_upstream_headers(incoming: &HeaderMap, forward_user_agent: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for name in FORWARDED_HEADERS {
        if let Some(value) = incoming.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    let user_agent = incoming
        .get(header::USER_AGENT)
        .filter(|_| forward_user_agent)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(header::USER_AGENT, user_agent);

    headers
}

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

/// Filter hop-by-hop headers from a response
///
/// Used when relaying upstream responses back to the caller.
pub fn filter_response_headers(response_headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();

    for (name, value) in response_headers {
        if !is_hop_by_hop_header(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}

/// Headers for a proxied media body
///
/// Content type comes from upstream or `default_content_type`; length and
/// range headers are copied so seeking keeps working.
pub fn stream_response_headers(upstream: &HeaderMap, default_content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = upstream
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(default_content_type));
    headers.insert(header::CONTENT_TYPE, content_type);

    for name in STREAM_HEADERS {
        if let Some(value) = upstream.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    headers
}

/// Headers for proxied cover art
///
/// Content type and cache directive come from upstream or the defaults.
pub fn picture_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        upstream
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_IMAGE_CONTENT_TYPE)),
    );
    headers.insert(
        header::CACHE_CONTROL,
        upstream
            .get(header::CACHE_CONTROL)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_IMAGE_CACHE_CONTROL)),
    );

    headers
}

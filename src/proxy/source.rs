//! Request classification and source-specific URL fixups
//!
//! The upstream serves several platforms through one endpoint. Most requests
//! are relayed untouched; stream URLs and Kuwo cover art need special care.

use reqwest::Url;

/// Host fragment identifying QQ Music stream servers
pub const QQ_STREAM_HOST: &str = "qqmusic.qq.com";

/// Source identifier for QQ Music
pub const SOURCE_QQ: &str = "qq";

/// Source identifier for Kuwo
pub const SOURCE_KUWO: &str = "kuwo";

/// How the proxy handles a given inbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `type=url`: resolve the redirect manually and stream the target
    Stream,
    /// `type=pic&source=kuwo`: proxy the image bytes with a forced 200
    KuwoPicture,
    /// Everything else: forward with redirect following
    Passthrough,
}

impl RequestKind {
    /// Classify a request from its `type` and `source` query parameters
    pub fn classify(kind: Option<&str>, source: Option<&str>) -> Self {
        match (kind, source) {
            (Some("url"), _) => RequestKind::Stream,
            (Some("pic"), Some(SOURCE_KUWO)) => RequestKind::KuwoPicture,
            _ => RequestKind::Passthrough,
        }
    }

    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Stream => "stream",
            RequestKind::KuwoPicture => "kuwo_pic",
            RequestKind::Passthrough => "passthrough",
        }
    }
}

/// Whether a resolved stream location must be fetched the QQ way
///
/// QQ stream hosts reject https, so these locations are fetched over plain http.
pub fn is_qq_stream(source: Option<&str>, location: &Url) -> bool {
    source == Some(SOURCE_QQ)
        || location
            .host_str()
            .map(|host| host.contains(QQ_STREAM_HOST))
            .unwrap_or(false)
}

/// Return `location` rewritten to the given scheme (`http` or `https`)
///
/// Locations whose scheme cannot be swapped are returned unchanged.
pub fn with_scheme(location: &Url, scheme: &str) -> Url {
    let mut rewritten = location.clone();
    if rewritten.set_scheme(scheme).is_err() {
        return location.clone();
    }
    rewritten
}

/// Pick the URL the stream bytes are fetched from
pub fn stream_fetch_target(source: Option<&str>, location: &Url, upgrade_https: bool) -> Url {
    if is_qq_stream(source, location) {
        with_scheme(location, "http")
    } else if upgrade_https {
        with_scheme(location, "https")
    } else {
        location.clone()
    }
}

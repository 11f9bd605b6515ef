//! Music API proxy handler
//!
//! `GET|HEAD|OPTIONS /api/music?<query>` forwards the query to the TuneHub
//! upstream and relays the answer on this origin.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    error::AppError,
    proxy::{RequestContext, RequestKind},
    routes::metrics::record_request,
    AppState,
};

/// Query parameters the proxy inspects; everything else passes through untouched
#[derive(Debug, Default)]
pub struct MusicQuery {
    pub request_type: Option<String>,
    pub source: Option<String>,
}

impl MusicQuery {
    /// Read `type` and `source` from a request URI
    ///
    /// Repeated keys keep their first value; an unparsable query reads as empty.
    pub fn from_uri(uri: &Uri) -> Self {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };

        Self {
            request_type: first("type"),
            source: first("source"),
        }
    }
}

/// Proxy handler for `/api/music`
///
/// Answers preflights, rejects anything but GET/HEAD, and dispatches on the
/// `type`/`source` parameters:
/// - `type=url` resolves the stream redirect and proxies the audio
/// - `type=pic&source=kuwo` proxies the image bytes
/// - everything else is relayed as-is
pub async fn music_proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    if method != Method::GET && method != Method::HEAD {
        debug!(method = %method, "Rejecting method");
        return AppError::MethodNotAllowed.into_response();
    }

    let start_time = Instant::now();
    let raw_query = uri.query();
    let query = MusicQuery::from_uri(&uri);
    let source = query.source.as_deref();

    let kind = RequestKind::classify(query.request_type.as_deref(), source);
    let ctx = RequestContext::new(kind.label())
        .with_request_type(query.request_type.as_deref())
        .with_source(source);
    ctx.log_request_start(method.as_str());

    let upstream = &state.upstream;
    let result = match kind {
        RequestKind::Stream => {
            upstream
                .stream(&ctx, method, raw_query, source, &headers)
                .await
        }
        RequestKind::KuwoPicture => {
            upstream
                .proxy_picture(&ctx, method, raw_query, &headers)
                .await
        }
        RequestKind::Passthrough => upstream.forward(&ctx, method, raw_query, &headers).await,
    };

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            ctx.log_warning(&err.to_string());
            err.into_response()
        }
    };

    let status_label = if response.status().is_success() {
        "success"
    } else {
        "error"
    };
    record_request(status_label, kind.label(), start_time.elapsed().as_secs_f64());
    ctx.log_request_complete(response.status().as_u16());

    response
}

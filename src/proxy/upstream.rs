//! TuneHub upstream client
//!
//! Forwards inbound requests to the upstream API and relays the answers,
//! including the manual redirect resolution used for audio streams.

use axum::body::Body;
use axum::http::{header, Method, Response, StatusCode};
use reqwest::header::HeaderMap;
use reqwest::Url;
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::{
        headers::{
            build_upstream_headers, filter_response_headers, picture_response_headers,
            stream_response_headers, DEFAULT_AUDIO_CONTENT_TYPE,
        },
        logging::RequestContext,
        source::stream_fetch_target,
    },
};

/// Client for the TuneHub upstream API
pub struct UpstreamClient {
    /// Follows redirects automatically
    client: reqwest::Client,
    /// Never follows redirects; used to read the `location` of stream URLs
    resolver: reqwest::Client,
    base_url: String,
    forward_user_agent: bool,
    upgrade_stream_https: bool,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(client: reqwest::Client, resolver: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            resolver,
            base_url: config.upstream_url.clone(),
            forward_user_agent: config.forward_user_agent,
            upgrade_stream_https: config.upgrade_stream_https,
        }
    }

    /// Upstream URL for an inbound query string, copied verbatim
    pub fn upstream_url(&self, raw_query: Option<&str>) -> String {
        match raw_query {
            Some(query) if !query.is_empty() => format!("{}?{}", self.base_url, query),
            _ => self.base_url.clone(),
        }
    }

    /// Forward a request with redirect following and relay the answer as-is
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        method: Method,
        raw_query: Option<&str>,
        incoming_headers: &HeaderMap,
    ) -> AppResult<Response<Body>> {
        let url = self.upstream_url(raw_query);
        let headers = build_upstream_headers(incoming_headers, self.forward_user_agent);

        let response = self.send(ctx, method, &url, headers, true).await?;
        relay_response(response)
    }

    /// Proxy cover art bytes instead of handing out the image host's URL
    ///
    /// A successful answer is always reported as 200 with a content type and
    /// cache directive; failures are relayed unmodified.
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn proxy_picture(
        &self,
        ctx: &RequestContext,
        method: Method,
        raw_query: Option<&str>,
        incoming_headers: &HeaderMap,
    ) -> AppResult<Response<Body>> {
        let url = self.upstream_url(raw_query);
        let headers = build_upstream_headers(incoming_headers, self.forward_user_agent);

        let response = self.send(ctx, method, &url, headers, true).await?;
        if !response.status().is_success() {
            ctx.log_warning("Picture request failed upstream, relaying as-is");
            return relay_response(response);
        }

        let headers = picture_response_headers(response.headers());

        build_response(
            StatusCode::OK,
            headers,
            Body::from_stream(response.bytes_stream()),
        )
    }

    /// Resolve a stream URL redirect and proxy the audio bytes
    ///
    /// The primary request never follows redirects. When the upstream answers
    /// with a redirect, the `location` is rewritten for its platform and
    /// fetched here; any other answer is relayed unchanged.
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn stream(
        &self,
        ctx: &RequestContext,
        method: Method,
        raw_query: Option<&str>,
        source: Option<&str>,
        incoming_headers: &HeaderMap,
    ) -> AppResult<Response<Body>> {
        let url = self.upstream_url(raw_query);
        let headers = build_upstream_headers(incoming_headers, self.forward_user_agent);

        let response = self
            .send(ctx, method.clone(), &url, headers.clone(), false)
            .await?;

        let location = if is_redirect(response.status()) {
            redirect_location(&url, response.headers())
        } else {
            None
        };

        let Some(location) = location else {
            return relay_response(response);
        };

        let target = stream_fetch_target(source, &location, self.upgrade_stream_https);
        ctx.log_redirect_resolved(location.as_str(), target.as_str());
        ctx.log_upstream_request(target.as_str(), true);

        let stream = self
            .client
            .request(method, target.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|err| {
                ctx.log_connection_error(&err.to_string(), target.as_str());
                AppError::StreamUnreachable {
                    url: target.to_string(),
                    source: err,
                }
            })?;

        let status = stream.status();
        ctx.log_upstream_response(status.as_u16(), stream.content_length());

        if !status.is_success() {
            ctx.log_warning("Stream host rejected the request");
            return Err(AppError::StreamStatus { status });
        }

        let headers = stream_response_headers(stream.headers(), DEFAULT_AUDIO_CONTENT_TYPE);
        build_response(status, headers, Body::from_stream(stream.bytes_stream()))
    }

    /// Send a request to the primary upstream URL
    async fn send(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        headers: HeaderMap,
        follow_redirects: bool,
    ) -> AppResult<reqwest::Response> {
        ctx.log_upstream_request(url, follow_redirects);

        let client = if follow_redirects {
            &self.client
        } else {
            &self.resolver
        };

        let response = client
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| {
                ctx.log_connection_error(&source.to_string(), url);
                AppError::UpstreamUnreachable {
                    url: url.to_string(),
                    source,
                }
            })?;

        ctx.log_upstream_response(response.status().as_u16(), response.content_length());
        Ok(response)
    }
}

/// Whether a status carries a `location` worth resolving
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Read the `location` header, resolved against the request URL
fn redirect_location(request_url: &str, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    Url::parse(request_url).ok()?.join(location).ok()
}

/// Relay an upstream response unchanged, minus hop-by-hop headers
fn relay_response(response: reqwest::Response) -> AppResult<Response<Body>> {
    let status = response.status();
    let headers = filter_response_headers(response.headers());
    build_response(status, headers, Body::from_stream(response.bytes_stream()))
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> AppResult<Response<Body>> {
    let mut builder = Response::builder().status(status);
    if let Some(builder_headers) = builder.headers_mut() {
        builder_headers.extend(headers);
    }

    builder
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

//! TuneHub Proxy - same-origin gateway for the TuneHub music API
//!
//! This library provides the proxy server that relays search, metadata,
//! lyrics, cover art and audio streams from the upstream API, plus a typed
//! client for calling the proxy.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;

use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::client::MusicApiClient;
pub use crate::config::Config;
pub use crate::proxy::UpstreamClient;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Client for the TuneHub upstream
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);

        // Initialize HTTP clients with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(timeout)
            .build()?;

        // Stream URLs are resolved by hand, so this one must not follow redirects
        let resolver_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let upstream = UpstreamClient::new(http_client, resolver_client, &config);

        Ok(Self {
            config,
            start_time: Instant::now(),
            upstream,
        })
    }
}

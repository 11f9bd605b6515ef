//! Configuration management for the TuneHub proxy
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Default TuneHub API base the proxy forwards to
pub const DEFAULT_UPSTREAM_URL: &str = "https://music-dl.sayqz.com/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Upstream API base URL (the inbound query string is appended verbatim)
    pub upstream_url: String,

    /// Forward the caller's User-Agent instead of the fixed browser one
    pub forward_user_agent: bool,
    /// Upgrade non-QQ stream locations to https before fetching them
    pub upgrade_stream_https: bool,

    /// Client-wide timeout for outbound requests (in seconds)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            host: var("TUNEHUB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("TUNEHUB_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid TUNEHUB_PORT")?,

            upstream_url: var("TUNEHUB_UPSTREAM_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),

            forward_user_agent: flag(var("TUNEHUB_FORWARD_USER_AGENT"), false),
            upgrade_stream_https: flag(var("TUNEHUB_UPGRADE_STREAM_HTTPS"), true),

            request_timeout_seconds: var("TUNEHUB_REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("Invalid TUNEHUB_REQUEST_TIMEOUT_SECONDS")?,
        })
    }

    /// Configuration pointing at a specific upstream, everything else defaulted
    pub fn with_upstream(upstream_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            upstream_url: upstream_url.into(),
            forward_user_agent: false,
            upgrade_stream_https: true,
            request_timeout_seconds: 300,
        }
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    value.map(|v| v == "true" || v == "1").unwrap_or(default)
}

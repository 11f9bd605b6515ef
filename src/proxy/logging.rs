//! Request logging utilities for upstream proxying
//!
//! Provides structured logging with correlation IDs so a request can be
//! followed through redirect resolution and the secondary stream fetch.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Context for tracking a request through the proxy
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Handling branch (`stream`, `kuwo_pic`, `passthrough`)
    pub kind: &'static str,
    /// Value of the `type` query parameter
    pub request_type: Option<String>,
    /// Value of the `source` query parameter
    pub source: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(kind: &'static str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            kind,
            request_type: None,
            source: None,
        }
    }

    /// Set the `type` parameter for this request
    pub fn with_request_type(mut self, request_type: Option<&str>) -> Self {
        self.request_type = request_type.map(str::to_string);
        self
    }

    /// Set the `source` parameter for this request
    pub fn with_source(mut self, source: Option<&str>) -> Self {
        self.source = source.map(str::to_string);
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request initiation
    pub fn log_request_start(&self, method: &str) {
        info!(
            trace_id = %self.trace_id,
            kind = %self.kind,
            method = %method,
            request_type = ?self.request_type,
            source = ?self.source,
            "Request started"
        );
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, url: &str, follow_redirects: bool) {
        debug!(
            trace_id = %self.trace_id,
            url = %url,
            follow_redirects = %follow_redirects,
            elapsed_ms = %self.elapsed_ms(),
            "Sending request to upstream"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, content_length: Option<u64>) {
        info!(
            trace_id = %self.trace_id,
            kind = %self.kind,
            status = %status,
            content_length = ?content_length,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log a resolved stream redirect
    pub fn log_redirect_resolved(&self, location: &str, fetch_target: &str) {
        info!(
            trace_id = %self.trace_id,
            source = ?self.source,
            location = %location,
            fetch_target = %fetch_target,
            elapsed_ms = %self.elapsed_ms(),
            "Stream redirect resolved"
        );
    }

    /// Log successful request completion
    pub fn log_request_complete(&self, status: u16) {
        info!(
            trace_id = %self.trace_id,
            kind = %self.kind,
            request_type = ?self.request_type,
            source = ?self.source,
            status = %status,
            elapsed_ms = %self.elapsed_ms(),
            "Request completed"
        );
    }

    /// Log a warning condition
    pub fn log_warning(&self, message: &str) {
        warn!(
            trace_id = %self.trace_id,
            kind = %self.kind,
            elapsed_ms = %self.elapsed_ms(),
            message = %message,
            "Warning during request"
        );
    }

    /// Log connection error (specific for debugging connectivity issues)
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            kind = %self.kind,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }
}

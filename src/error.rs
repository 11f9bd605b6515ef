//! Error types for the TuneHub proxy
//!
//! This module defines the error type returned by the proxy handler and the
//! JSON bodies it renders to.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The primary upstream request could not be sent
    #[error("Upstream request to {url} failed: {source}")]
    UpstreamUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The resolved stream location could not be fetched
    #[error("Stream fetch from {url} failed: {source}")]
    StreamUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The resolved stream location answered with a non-2xx status
    #[error("Stream host answered {status}")]
    StreamStatus { status: StatusCode },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error body for transport failures: `{error, message, url}`
#[derive(Debug, Serialize)]
pub struct TransportErrorBody {
    pub error: String,
    pub message: String,
    pub url: String,
}

/// Error body for upstream status failures: `{error, status, statusText}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusErrorBody {
    pub error: String,
    pub status: u16,
    pub status_text: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Method not allowed",
            )
                .into_response(),
            AppError::UpstreamUnreachable { url, source } => (
                StatusCode::BAD_GATEWAY,
                Json(TransportErrorBody {
                    error: "Upstream request failed".to_string(),
                    message: source.to_string(),
                    url,
                }),
            )
                .into_response(),
            AppError::StreamUnreachable { url, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TransportErrorBody {
                    error: "Failed to fetch audio stream".to_string(),
                    message: source.to_string(),
                    url,
                }),
            )
                .into_response(),
            AppError::StreamStatus { status } => (
                status,
                Json(StatusErrorBody {
                    error: "Failed to fetch audio".to_string(),
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                }),
            )
                .into_response(),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

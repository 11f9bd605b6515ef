//! HTTP routes for the TuneHub proxy
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod health;
pub mod metrics;
pub mod music;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{middleware::cors::cors_middleware, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Method gating happens in the handler so rejections still get CORS headers
    let proxy_routes = Router::new()
        .route("/api/music", any(music::music_proxy))
        .route("/api/music/", any(music::music_proxy));

    // Public routes (health checks, metrics)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(proxy_routes)
        // Global middleware (applied to all routes); the first layer runs outermost
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cors_middleware)),
        )
        .with_state(state)
}

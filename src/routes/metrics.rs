//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    metrics::describe_counter!(
        "tunehub_requests_total",
        "Total number of proxied requests"
    );
    metrics::describe_histogram!(
        "tunehub_request_duration_seconds",
        "Time until the upstream answer started streaming back, in seconds"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a proxied request
pub fn record_request(status: &str, kind: &str, duration_secs: f64) {
    metrics::counter!("tunehub_requests_total", "status" => status.to_string(), "type" => kind.to_string())
        .increment(1);
    metrics::histogram!("tunehub_request_duration_seconds", "type" => kind.to_string())
        .record(duration_secs);
}

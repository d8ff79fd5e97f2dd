//! Prometheus metrics endpoint

use axum::response::IntoResponse;

use crate::telemetry;

/// Returns metrics in Prometheus text format for scraping.
pub async fn prometheus_metrics() -> impl IntoResponse {
    telemetry::render()
}

//! Prometheus metrics
//!
//! Records one counter sample and one duration sample per generation call.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize metrics (call once at startup)
///
/// Fails if another global recorder is already installed.
pub fn init_metrics() -> anyhow::Result<()> {
    PROMETHEUS_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;

    metrics::describe_counter!(
        "augur_generations_total",
        "Total number of generation calls by outcome"
    );
    metrics::describe_histogram!(
        "augur_generation_duration_seconds",
        "Generation call duration in seconds"
    );

    Ok(())
}

/// Render metrics in Prometheus text format
///
/// Empty until [`init_metrics`] has run.
pub fn render() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record the outcome of one generation call
pub fn record_generation(outcome: &str, provider: &str, duration_secs: f64) {
    metrics::counter!(
        "augur_generations_total",
        "outcome" => outcome.to_string(),
        "provider" => provider.to_string()
    )
    .increment(1);
    metrics::histogram!("augur_generation_duration_seconds", "provider" => provider.to_string())
        .record(duration_secs);
}

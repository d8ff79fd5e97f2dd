//! Health check endpoints
//!
//! - `/health` - Full health check with provider configuration status
//! - `/health/ready` - Readiness probe
//! - `/health/live` - Liveness probe

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Provider configuration check
///
/// Only reports presence; no request is sent to the provider.
#[derive(Debug, Serialize)]
pub struct ProviderCheck {
    pub status: HealthStatus,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub provider: ProviderCheck,
}

/// Simple health response for liveness/readiness
#[derive(Debug, Serialize)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

fn check_provider(state: &AppState) -> ProviderCheck {
    let settings = state.settings.resolve();
    let complete = settings.is_complete();

    ProviderCheck {
        status: if complete {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        provider: state.factory.name().to_string(),
        model: settings.model.filter(|m| !m.trim().is_empty()),
        error: (!complete).then(|| "GEMINI_API_KEY or GEMINI_MODEL is not set".to_string()),
    }
}

/// Full health check endpoint
///
/// Always 200: a missing provider configuration degrades generation but the
/// process itself is up.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let provider = check_provider(&state);
    let uptime = state.start_time.elapsed().as_secs();

    let response = HealthResponse {
        status: provider.status.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        timestamp: chrono::Utc::now().to_rfc3339(),
        provider,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness probe endpoint
///
/// Returns 503 while the provider credential or model is missing.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SimpleHealthResponse>) {
    let provider = check_provider(&state);

    let status_code = match provider.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(SimpleHealthResponse {
            status: provider.status,
        }),
    )
}

/// Liveness probe endpoint
pub async fn liveness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: HealthStatus::Healthy,
        }),
    )
}

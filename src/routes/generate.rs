//! Generation endpoint
//!
//! `POST /api/ai/generate` with `{"prompt": "..."}` returns
//! `{"responseText": "..."}` or a classified error body.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    error::{AppError, AppResult},
    generate_with, AppState,
};

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub response_text: String,
}

/// Generate text for a prompt
///
/// An empty prompt is rejected here; any other text goes to the provider
/// unchanged. Provider settings are resolved for every request. If the
/// client goes away the handler future is dropped, which releases the
/// session.
#[instrument(skip_all)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if request.prompt.is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }

    let settings = state.settings.resolve();
    debug!(prompt_len = request.prompt.len(), "Generate request received");

    // Never cancelled: a client disconnect drops this future instead
    let response_text = generate_with(
        state.factory.as_ref(),
        &settings,
        &request.prompt,
        &CancellationToken::new(),
    )
    .await?;

    Ok(Json(GenerateResponse { response_text }))
}

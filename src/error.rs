//! Error types for Augur
//!
//! `AiError` is the flat outcome taxonomy of a generation call.
//! `ProviderError` carries the low-level cause from the transport.
//! `AppError` adapts both to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::gemini::types::{BlockReason, FinishReason};

/// Low-level failure talking to the model provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode provider reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled by caller")]
    Cancelled,

    #[error("session already closed")]
    Closed,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Outcome of a failed generation call
#[derive(Debug, Error)]
pub enum AiError {
    #[error("GEMINI_API_KEY is not set")]
    MissingCredential,

    #[error("GEMINI_MODEL is not set")]
    MissingModel,

    #[error("failed to initialize AI client: {0}")]
    SessionInit(#[source] ProviderError),

    #[error("failed to generate content: {0}")]
    Generation(#[source] ProviderError),

    #[error("content generation blocked by AI, reason: {0}")]
    SafetyBlocked(BlockReason),

    #[error("candidate generation finished unexpectedly, reason: {0}")]
    AbnormalFinish(FinishReason),

    #[error("unexpected response format from AI: {0}")]
    UnexpectedFormat(String),

    #[error("empty or invalid response structure from AI")]
    EmptyResponse,
}

/// Discriminant of [`AiError`], used as a stable label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    MissingModel,
    SessionInit,
    Generation,
    SafetyBlocked,
    AbnormalFinish,
    UnexpectedFormat,
    EmptyResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::MissingModel => "missing_model",
            ErrorKind::SessionInit => "session_init_error",
            ErrorKind::Generation => "generation_error",
            ErrorKind::SafetyBlocked => "safety_blocked",
            ErrorKind::AbnormalFinish => "abnormal_finish",
            ErrorKind::UnexpectedFormat => "unexpected_format",
            ErrorKind::EmptyResponse => "empty_response",
        }
    }
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::MissingCredential => ErrorKind::MissingCredential,
            AiError::MissingModel => ErrorKind::MissingModel,
            AiError::SessionInit(_) => ErrorKind::SessionInit,
            AiError::Generation(_) => ErrorKind::Generation,
            AiError::SafetyBlocked(_) => ErrorKind::SafetyBlocked,
            AiError::AbnormalFinish(_) => ErrorKind::AbnormalFinish,
            AiError::UnexpectedFormat(_) => ErrorKind::UnexpectedFormat,
            AiError::EmptyResponse => ErrorKind::EmptyResponse,
        }
    }

    /// True when the caller's cancellation signal ended the call
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AiError::Generation(ProviderError::Cancelled))
    }
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Ai(err) => match err {
                AiError::MissingCredential | AiError::MissingModel => {
                    (StatusCode::SERVICE_UNAVAILABLE, "AI_NOT_CONFIGURED")
                }
                AiError::SessionInit(_) => (StatusCode::BAD_GATEWAY, "SESSION_INIT_ERROR"),
                AiError::Generation(ProviderError::Timeout) => {
                    (StatusCode::GATEWAY_TIMEOUT, "GENERATION_ERROR")
                }
                AiError::Generation(ProviderError::Cancelled) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_ERROR")
                }
                AiError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_ERROR"),
                AiError::SafetyBlocked(_) => (StatusCode::UNPROCESSABLE_ENTITY, "SAFETY_BLOCKED"),
                AiError::AbnormalFinish(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "ABNORMAL_FINISH")
                }
                AiError::UnexpectedFormat(_) => (StatusCode::BAD_GATEWAY, "UNEXPECTED_FORMAT"),
                AiError::EmptyResponse => (StatusCode::BAD_GATEWAY, "EMPTY_RESPONSE"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal details stay in the logs
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

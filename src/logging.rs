//! Call logging utilities
//!
//! Provides structured logging with correlation IDs so the events of one
//! generation call can be picked out of interleaved output.

use std::time::Instant;

use tracing::{error, info, warn, Span};
use uuid::Uuid;

use crate::error::{AiError, ErrorKind};

/// Context for tracking one generation call
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Unique identifier for this call (for log correlation)
    pub trace_id: String,
    /// When the call started
    pub start_time: Instant,
    /// Provider handling this call
    pub provider: String,
    /// Model being used (if configured)
    pub model: Option<String>,
    /// Prompt length in characters; the prompt itself is never logged
    pub prompt_chars: usize,
}

impl CallContext {
    pub fn new(provider: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            provider: provider.to_string(),
            model: None,
            prompt_chars: 0,
        }
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_string);
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt_chars = prompt.chars().count();
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    pub fn log_call_start(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = ?self.model,
            prompt_chars = %self.prompt_chars,
            "Generation started"
        );
    }

    pub fn log_call_complete(&self, response_chars: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = ?self.model,
            response_chars = %response_chars,
            elapsed_ms = %self.elapsed_ms(),
            "Generation completed successfully"
        );
    }

    /// Log a failed call
    ///
    /// Provider-side refusals are warnings; broken sessions and transport
    /// failures are errors.
    pub fn log_failure(&self, err: &AiError) {
        let kind = err.kind();
        match kind {
            ErrorKind::SessionInit | ErrorKind::Generation if !err.is_cancelled() => error!(
                trace_id = %self.trace_id,
                provider = %self.provider,
                model = ?self.model,
                kind = kind.as_str(),
                elapsed_ms = %self.elapsed_ms(),
                error = %err,
                "Generation failed"
            ),
            _ => warn!(
                trace_id = %self.trace_id,
                provider = %self.provider,
                model = ?self.model,
                kind = kind.as_str(),
                elapsed_ms = %self.elapsed_ms(),
                error = %err,
                "Generation did not produce text"
            ),
        }
    }

    /// Create a tracing span for this call
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "ai_generate",
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = ?self.model,
        )
    }
}

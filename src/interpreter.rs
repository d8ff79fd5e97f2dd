//! Response interpreter
//!
//! Sends one prompt through a session and classifies the reply. Precedence:
//!
//! 1. transport/provider failure
//! 2. first part of the first candidate is non-empty text → success
//! 3. first part of the first candidate is not text → unexpected format
//! 4. prompt feedback carries a block reason → safety blocked
//! 5. any candidate finished for an abnormal reason → abnormal finish
//! 6. otherwise → empty response

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    error::{AiError, ProviderError},
    gemini::types::{GenerateContentRequest, GenerateContentResponse, Part},
    session::SessionGuard,
};

const NON_TEXT_PART: &str = "content part is not text";

/// Classify a provider reply
pub fn interpret(reply: &GenerateContentResponse) -> Result<String, AiError> {
    match reply.first_part() {
        Some(Part::Text { text }) if !text.is_empty() => return Ok(text.clone()),
        Some(Part::Other(_)) => return Err(AiError::UnexpectedFormat(NON_TEXT_PART.to_string())),
        _ => {}
    }

    if let Some(reason) = reply.block_reason() {
        return Err(AiError::SafetyBlocked(reason.clone()));
    }

    let abnormal = reply
        .candidates
        .iter()
        .filter_map(|candidate| candidate.finish_reason.as_ref())
        .find(|reason| reason.is_abnormal());

    if let Some(reason) = abnormal {
        return Err(AiError::AbnormalFinish(reason.clone()));
    }

    Err(AiError::EmptyResponse)
}

/// Send `prompt` through `session` and classify the reply
///
/// The session is released before this returns, whatever the outcome. If
/// `cancel` fires while the request is in flight the request is abandoned
/// and `Generation(Cancelled)` is returned.
#[instrument(skip_all, fields(model = %session.model()))]
pub async fn generate(
    mut session: SessionGuard,
    prompt: &str,
    cancel: &CancellationToken,
) -> Result<String, AiError> {
    let request = GenerateContentRequest::from_prompt(prompt);

    let reply = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = session.generate(&request) => result,
    };

    session.release();

    let reply = reply.map_err(AiError::Generation)?;

    interpret(&reply)
}

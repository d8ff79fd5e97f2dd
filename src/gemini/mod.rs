//! Google Gemini provider
//!
//! Wire types for `generateContent` and the REST session that sends them.

pub mod client;
pub mod types;

pub use client::{GeminiConnector, GeminiSession};
pub use types::{
    BlockReason, Candidate, Content, FinishReason, GenerateContentRequest,
    GenerateContentResponse, Part, PromptFeedback, UsageMetadata,
};

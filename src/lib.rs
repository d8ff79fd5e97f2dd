//! Augur - Gemini response interpreter
//!
//! Sends a single prompt to a Gemini model and turns the reply into either
//! the generated text or a classified [`AiError`]. Every call opens its own
//! session and releases it before returning.

pub mod config;
pub mod error;
pub mod gemini;
pub mod interpreter;
pub mod logging;
pub mod routes;
pub mod session;
pub mod telemetry;

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub use crate::config::{Config, ProviderSettings, SettingsSource};
pub use crate::error::{AiError, AppError, ErrorKind, ProviderError};
pub use crate::gemini::GeminiConnector;
pub use crate::interpreter::{generate, interpret};
pub use crate::session::{create_session, ModelSession, SessionFactory, SessionGuard};

use crate::logging::CallContext;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    /// Where provider settings come from on each request
    pub settings: SettingsSource,
    /// Opens provider sessions
    pub factory: Arc<dyn SessionFactory>,
    pub start_time: Instant,
}

impl AppState {
    /// Production state: Gemini sessions, settings read from the environment per call
    pub fn new(config: Config) -> Self {
        Self::with_provider(config, SettingsSource::Environment, Arc::new(GeminiConnector::new()))
    }

    /// State with an explicit settings source and session factory
    pub fn with_provider(
        config: Config,
        settings: SettingsSource,
        factory: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            config,
            settings,
            factory,
            start_time: Instant::now(),
        }
    }
}

/// Run one generation call with explicit settings
///
/// Order of checks: credential, model, session open, request. The prompt
/// is sent as given.
pub async fn generate_with(
    factory: &dyn SessionFactory,
    settings: &ProviderSettings,
    prompt: &str,
    cancel: &CancellationToken,
) -> Result<String, AiError> {
    let ctx = CallContext::new(factory.name())
        .with_model(settings.model.as_deref())
        .with_prompt(prompt);
    let span = ctx.create_span();

    async move {
        ctx.log_call_start();

        let result = match create_session(factory, settings).await {
            Ok(session) => generate(session, prompt, cancel).await,
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(text) => {
                ctx.log_call_complete(text.chars().count());
                "success"
            }
            Err(e) => {
                ctx.log_failure(e);
                e.kind().as_str()
            }
        };
        telemetry::record_generation(
            outcome,
            factory.name(),
            ctx.start_time.elapsed().as_secs_f64(),
        );

        result
    }
    .instrument(span)
    .await
}

/// Generate content for `prompt` using settings from the process environment
///
/// `GEMINI_API_KEY` and `GEMINI_MODEL` are read on every call.
pub async fn generate_content(prompt: &str) -> Result<String, AiError> {
    let settings = ProviderSettings::from_env();
    generate_with(&GeminiConnector::new(), &settings, prompt, &CancellationToken::new()).await
}

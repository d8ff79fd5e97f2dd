//! Session factory
//!
//! Validates provider settings and opens one session per call. The session
//! lives inside a [`SessionGuard`], which closes it exactly once: either on
//! an explicit [`SessionGuard::release`] or when the guard is dropped (early
//! return, panic unwind, or a cancelled future).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use crate::{
    config::ProviderSettings,
    error::{AiError, ProviderError},
    gemini::types::{GenerateContentRequest, GenerateContentResponse},
};

/// Validated parameters for opening a session
#[derive(Debug, Clone, Copy)]
pub struct SessionRequest<'a> {
    pub api_key: &'a SecretString,
    pub model: &'a str,
    pub api_url: &'a str,
    pub timeout: Duration,
}

/// A live handle to the model provider, bound to one model
#[async_trait]
pub trait ModelSession: Send {
    /// Model this session is bound to
    fn model(&self) -> &str;

    /// Issue one generation request
    async fn generate(
        &mut self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError>;

    /// Release the resources held by the session
    fn close(&mut self);
}

/// Opens provider sessions
///
/// Implementations make a single attempt; retries are the caller's concern.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Provider name for logging and metrics
    fn name(&self) -> &'static str;

    async fn open(&self, request: SessionRequest<'_>) -> Result<Box<dyn ModelSession>, ProviderError>;
}

/// Owns a session for the duration of one call
pub struct SessionGuard {
    session: Box<dyn ModelSession>,
    released: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn ModelSession>) -> Self {
        Self {
            session,
            released: false,
        }
    }

    pub fn model(&self) -> &str {
        self.session.model()
    }

    pub async fn generate(
        &mut self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        self.session.generate(request).await
    }

    /// Close the session now
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.session.close();
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.close_once();
    }
}

/// Validate settings and open a session
///
/// The credential is checked before the model; both checks happen before
/// the factory is touched.
#[instrument(skip_all, fields(provider = factory.name()))]
pub async fn create_session(
    factory: &dyn SessionFactory,
    settings: &ProviderSettings,
) -> Result<SessionGuard, AiError> {
    let api_key = settings
        .api_key
        .as_ref()
        .filter(|key| !key.expose_secret().trim().is_empty())
        .ok_or(AiError::MissingCredential)?;

    let model = settings
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .ok_or(AiError::MissingModel)?;

    let request = SessionRequest {
        api_key,
        model,
        api_url: &settings.api_url,
        timeout: settings.timeout,
    };

    match factory.open(request).await {
        Ok(session) => {
            debug!(model = %model, "Session opened");
            Ok(SessionGuard::new(session))
        }
        Err(e) => {
            error!(model = %model, error = %e, "Failed to initialize AI client");
            Err(AiError::SessionInit(e))
        }
    }
}

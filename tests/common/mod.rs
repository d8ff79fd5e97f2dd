//! Common test utilities for Augur
//!
//! Shared settings, a release-counting session factory, and a helper that
//! builds an `axum_test::TestServer` around the real router.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;

use augur::{
    config::SettingsSource,
    gemini::{GenerateContentRequest, GenerateContentResponse},
    routes,
    session::SessionRequest,
    AppState, Config, GeminiConnector, ModelSession, ProviderError, ProviderSettings,
    SessionFactory,
};

/// Test configuration constants
pub mod constants {
    /// API key the mock server expects
    pub const TEST_API_KEY: &str = "test-gemini-api-key";
    /// Model used in every test
    pub const TEST_MODEL: &str = "gemini-test";
    /// Default prompt
    pub const TEST_PROMPT: &str = "Explain the water cycle in one sentence.";
}

/// Provider settings pointing at a mock server
pub fn settings(api_url: &str) -> ProviderSettings {
    ProviderSettings::new(constants::TEST_API_KEY, constants::TEST_MODEL)
        .with_api_url(api_url)
        .with_timeout(Duration::from_secs(5))
}

/// Server config for tests (never bound)
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

/// Build a test server with fixed settings and the given factory
pub fn test_server(settings: ProviderSettings, factory: Arc<dyn SessionFactory>) -> TestServer {
    let state = Arc::new(AppState::with_provider(
        test_config(),
        SettingsSource::Fixed(settings),
        factory,
    ));

    TestServer::new(routes::create_router(state)).expect("Failed to create test server")
}

/// Wraps the Gemini connector and counts session opens and releases
#[derive(Default)]
pub struct CountingConnector {
    inner: GeminiConnector,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl CountingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for CountingConnector {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn open(&self, request: SessionRequest<'_>) -> Result<Box<dyn ModelSession>, ProviderError> {
        let inner = self.inner.open(request).await?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            inner,
            closed: self.closed.clone(),
        }))
    }
}

struct CountingSession {
    inner: Box<dyn ModelSession>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelSession for CountingSession {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(
        &mut self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        self.inner.generate(request).await
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close();
    }
}

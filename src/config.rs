//! Configuration management for Augur
//!
//! Server settings are loaded once at startup. Provider settings (API key,
//! model) are resolved per call so that a changed environment takes effect
//! without a restart.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

/// Default Gemini REST base URL
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for a single generation request
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Config {
    /// Load server configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("AUGUR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("AUGUR_PORT")
                .unwrap_or_else(|_| "8090".to_string())
                .parse()
                .context("Invalid AUGUR_PORT")?,
        })
    }
}

/// Settings for one call to the model provider
///
/// Both `api_key` and `model` are optional here; their presence is checked
/// by the session factory so that a missing value becomes a classified
/// failure instead of a startup error.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Gemini API key (never logged)
    pub api_key: Option<SecretString>,
    /// Model identifier, e.g. `gemini-2.0-flash`
    pub model: Option<String>,
    /// Base URL of the Gemini REST API
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Build settings from explicit values, using defaults for the rest
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            model: Some(model.into()),
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Point the settings at a different API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load provider settings from environment variables
    ///
    /// Missing `GEMINI_API_KEY` / `GEMINI_MODEL` are left as `None`. An
    /// unparsable `GEMINI_TIMEOUT_SECONDS` falls back to the default.
    pub fn from_env() -> Self {
        let timeout_secs = match env::var("GEMINI_TIMEOUT_SECONDS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid GEMINI_TIMEOUT_SECONDS, using default");
                DEFAULT_TIMEOUT_SECONDS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        Self {
            api_key: env::var("GEMINI_API_KEY").ok().map(SecretString::from),
            model: env::var("GEMINI_MODEL").ok(),
            api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Both the credential and the model are present and non-blank
    pub fn is_complete(&self) -> bool {
        let has_key = self
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty());
        let has_model = self
            .model
            .as_deref()
            .is_some_and(|model| !model.trim().is_empty());
        has_key && has_model
    }
}

/// Where request handlers obtain provider settings
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// Read the process environment on every call
    Environment,
    /// Use a fixed value
    Fixed(ProviderSettings),
}

impl SettingsSource {
    /// Resolve the settings for one call
    pub fn resolve(&self) -> ProviderSettings {
        match self {
            SettingsSource::Environment => ProviderSettings::from_env(),
            SettingsSource::Fixed(settings) => settings.clone(),
        }
    }
}

/// Serializes tests that mutate `GEMINI_*` environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

//! Gemini REST transport
//!
//! Every session gets its own `reqwest::Client`; nothing is shared between
//! calls. Opening a session performs no network I/O.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use secrecy::ExposeSecret;
use tracing::{debug, error, instrument};

use crate::{
    error::ProviderError,
    gemini::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
    session::{ModelSession, SessionFactory, SessionRequest},
};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Opens sessions against the Gemini REST API
#[derive(Debug, Clone, Default)]
pub struct GeminiConnector;

impl GeminiConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for GeminiConnector {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn open(&self, request: SessionRequest<'_>) -> Result<Box<dyn ModelSession>, ProviderError> {
        Ok(Box::new(GeminiSession::connect(request)?))
    }
}

/// A session bound to one model
pub struct GeminiSession {
    client: Option<reqwest::Client>,
    endpoint: Url,
    model: String,
}

impl GeminiSession {
    /// Build the HTTP client and resolve the endpoint
    pub fn connect(request: SessionRequest<'_>) -> Result<Self, ProviderError> {
        let mut api_key = HeaderValue::from_str(request.api_key.expose_secret())
            .map_err(|_| ProviderError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let endpoint = generate_endpoint(request.api_url, request.model)?;

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request.timeout)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client: Some(client),
            endpoint,
            model: request.model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

/// `{base}/models/{model}:generateContent`
fn generate_endpoint(api_url: &str, model: &str) -> Result<Url, ProviderError> {
    let model = model.strip_prefix("models/").unwrap_or(model);
    let raw = format!(
        "{}/models/{}:generateContent",
        api_url.trim_end_matches('/'),
        model
    );

    Url::parse(&raw).map_err(|e| ProviderError::InvalidEndpoint(format!("{}: {}", raw, e)))
}

#[async_trait]
impl ModelSession for GeminiSession {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(
        &mut self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let client = self.client.as_ref().ok_or(ProviderError::Closed)?;

        debug!(url = %self.endpoint.path(), "Sending generateContent request");

        let response = client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Gemini response received");

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => body,
            };
            error!(status = %status, message = %message, "Gemini request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response");
            ProviderError::Decode(e)
        })
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(model = %self.model, "Gemini session closed");
        }
    }
}

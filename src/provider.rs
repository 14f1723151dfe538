//! Generation Provider
//!
//! Client side of the external text-generation service. A [`GenerationClient`]
//! performs exactly one request for one candidate [`ServiceConfig`]; choosing
//! which candidate to try next is the orchestrator's job, not the client's.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub mod profile;
pub mod wire;

pub use profile::{default_candidates, ApiVersion, SafetySetting, ServiceConfig};

use wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Issues a single generation request for one candidate.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send `prompt` to the model selected by `config` and return the generated text.
    ///
    /// Failures are attempt-level errors (see [`ApiError::is_attempt_failure`]).
    async fn generate(
        &self,
        config: &ServiceConfig,
        credential: &str,
        prompt: &str,
    ) -> Result<String, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// HTTP timeouts applied by the underlying client.
#[derive(Debug, Clone, Copy)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(120),
        }
    }
}

fn build_provider_http_client(timeouts: HttpTimeouts) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

// The key travels in the query string, so the URL must never reach an error message.
fn map_http_error(error: reqwest::Error) -> ApiError {
    let error = error.without_url();
    if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: StatusCode, key_rejected: bool, message: String) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", message)),
        400 if key_rejected => {
            ApiError::ProviderAuthFailed(format!("Authentication failed: {}", message))
        }
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", message)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", message)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, message
        )),
    }
}

/// Credentials shorter than this are not real keys; replacing them would
/// only mangle ordinary words in the message.
const MIN_REDACTED_LEN: usize = 6;

/// Replace every occurrence of the credential in provider-supplied text.
pub fn redact(text: &str, credential: &str) -> String {
    if credential.len() < MIN_REDACTED_LEN {
        return text.to_string();
    }
    text.replace(credential, "***")
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: Option<String>, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let client = build_provider_http_client(timeouts)?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint for a candidate, without the credential.
    pub fn endpoint(&self, config: &ServiceConfig) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url,
            config.api_version.as_str(),
            config.model
        )
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        config: &ServiceConfig,
        credential: &str,
        prompt: &str,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(config);
        let request = GenerateContentRequest::for_prompt(config, prompt);
        debug!(model = %config.model, url = %url, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", credential)])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_http_error)?;

        if !status.is_success() {
            // Classify on the raw error, redact only what goes into the message.
            let (key_rejected, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.rejects_key(), envelope.error.message),
                Err(_) => (false, body),
            };
            return Err(map_status_error(
                status,
                key_rejected,
                redact(&message, credential),
            ));
        }

        if body.trim().is_empty() {
            return Err(ApiError::EmptyResponse("empty response body".to_string()));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::ProviderError(format!("Failed to parse response: {}", e))
        })?;

        parsed.into_text().map_err(|e| match e {
            ApiError::ProviderError(msg) => ApiError::ProviderError(redact(&msg, credential)),
            other => other,
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

// Scripted client for orchestrator tests
#[cfg(test)]
pub struct MockClient {
    responses: std::sync::Mutex<std::collections::HashMap<String, Result<String, ApiError>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockClient {
    pub fn new(responses: Vec<(&str, Result<String, ApiError>)>) -> Self {
        Self {
            responses: std::sync::Mutex::new(
                responses
                    .into_iter()
                    .map(|(model, result)| (model.to_string(), result))
                    .collect(),
            ),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl GenerationClient for MockClient {
    async fn generate(
        &self,
        config: &ServiceConfig,
        _credential: &str,
        _prompt: &str,
    ) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(config.model.clone());
        self.responses
            .lock()
            .unwrap()
            .get(&config.model)
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::ProviderModelNotFound(format!(
                    "Model not found: {}",
                    config.model
                )))
            })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

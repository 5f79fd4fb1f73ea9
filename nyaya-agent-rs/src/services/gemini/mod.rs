//! Generative Language API client implementation
//!
//! This module provides the production [`TextGenerator`]: a client for
//! `POST {base_url}/models/{model}:generateContent`, with per-attempt timeout
//! and bounded retry applied to every call.

mod models;
pub use models::*;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::{ConfigProvider, GeminiConfig, ServiceConfig, DEFAULT_PROVIDER};
use crate::core::{GenerationRequest, ModelTier, TextGenerator};
use crate::error::{AgentError, Result};
use crate::resilience::{Resilience, RetryConfig};
use crate::services::common::{build_http_client, parse_error_response, UserAgent};
use crate::util::{measure_time_async, truncate_string};

const SERVICE_NAME: &str = "gemini";

/// Generative Language API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
    resilience: Resilience,
}

impl GeminiClient {
    /// Create a client from the default environment provider
    ///
    /// Fails with a configuration error when no API key is available.
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Create a client from any configuration provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let config = GeminiConfig::from_provider(provider)?;
        Self::new_with_config(config)
    }

    /// Create a new client with custom configuration
    pub fn new_with_config(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("Gemini-Client".to_string()),
                ..UserAgent::default()
            }),
            // The per-attempt timeout is enforced by the resilience layer;
            // give the transport a little slack above it.
            Some(config.timeout * 2),
        )?;

        let resilience = Resilience::from_config(&config);

        Ok(Self {
            http_client,
            config,
            resilience,
        })
    }

    /// Create a new builder for the client
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    /// Current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Model name used for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Reasoning => &self.config.reasoning_model,
        }
    }

    /// Send a generateContent request
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let endpoint = format!("models/{}:generateContent", model);
        self.resilience
            .execute(|| self.post_once(&endpoint, body))
            .await
    }

    async fn post_once(&self, endpoint: &str, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("Sending request to Gemini: POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(SERVICE_NAME, endpoint, response).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| AgentError::parsing(format!("Failed to parse Gemini response: {}", e)))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let model = self.model_for(request.tier).to_string();
        let body = GenerateContentRequest::from(&request);

        let (result, elapsed) = measure_time_async(|| self.generate_content(&model, &body)).await;
        let response = result?;
        let text = response.text();

        if text.is_empty() {
            warn!(
                "Gemini model {} returned no text after {:?} (candidates: {})",
                model,
                elapsed,
                response.candidates.len()
            );
        } else {
            debug!(
                "Gemini model {} answered in {:?}: {}",
                model,
                elapsed,
                truncate_string(&text, 120)
            );
        }

        Ok(text)
    }
}

/// Builder for the Gemini client
#[derive(Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    reasoning_model: Option<String>,
    fast_model: Option<String>,
    timeout: Option<std::time::Duration>,
    retry_config: Option<RetryConfig>,
}

impl GeminiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model used for chat turns and drafting
    pub fn reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.reasoning_model = Some(model.into());
        self
    }

    /// Set the model used for translation
    pub fn fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast_model = Some(model.into());
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set retry configuration
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GeminiClient> {
        // Start from the environment when it is usable, otherwise from defaults
        let mut config = GeminiConfig::from_provider(&**DEFAULT_PROVIDER).unwrap_or_default();

        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = self.reasoning_model {
            config.reasoning_model = model;
        }
        if let Some(model) = self.fast_model {
            config.fast_model = model;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        let mut client = GeminiClient::new_with_config(config)?;

        if let Some(retry_config) = self.retry_config {
            client.resilience.configure_retry(retry_config);
        }

        Ok(client)
    }
}

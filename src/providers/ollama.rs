use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Translator, client_build_error, send_json};
use crate::errors::ProviderError;
use crate::translation::prompts::translator_prompt;

const PROVIDER_NAME: &str = "Ollama";

/// Ollama client for interacting with a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    pub model: String,
    /// Prompt to generate from
    pub prompt: String,
    /// Whether to stream the response
    pub stream: bool,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

impl Ollama {
    /// Create a new Ollama client for `base_url` (scheme, host and port)
    ///
    /// Ollama speaks HTTP/1.1; connections are kept alive between documents.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| client_build_error(PROVIDER_NAME, e))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            model: model.into(),
        })
    }

    /// Generate a completion
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        debug!("POST {} (model {})", url, request.model);

        let builder = self.client.post(&url).header("Content-Type", "application/json").json(&request);
        send_json(PROVIDER_NAME, builder).await
    }
}

#[async_trait]
impl Translator for Ollama {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, translator_prompt(text, source_language, target_language));
        let response = self.generate(request).await?;
        Ok(response.response.trim().to_string())
    }
}

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{MAX_OUTPUT_TOKENS, Translator, client_build_error, missing_content, send_json};
use crate::errors::ProviderError;
use crate::translation::prompts::translator_prompt;

const PROVIDER_NAME: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL, defaults to the public API
    endpoint: String,
    /// Model identifier
    model: String,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    pub model: String,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// The messages for the conversation
    pub messages: Vec<AnthropicMessage>,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type", default)]
    pub content_type: String,

    /// The text, present on text blocks
    #[serde(default)]
    pub text: Option<String>,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: Vec::new(),
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client whose requests time out after `timeout`
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| client_build_error(PROVIDER_NAME, e))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    /// Complete a messages request
    pub async fn complete(&self, request: AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let api_url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));
        debug!("POST {} (model {})", api_url, request.model);

        let builder = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request);

        send_json(PROVIDER_NAME, builder).await
    }

    /// Extract text from `content[0].text`
    pub fn extract_text(response: &AnthropicResponse) -> Result<String, ProviderError> {
        response
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| missing_content(PROVIDER_NAME, "content[0].text"))
    }
}

#[async_trait]
impl Translator for Anthropic {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = AnthropicRequest::new(&self.model, MAX_OUTPUT_TOKENS)
            .add_message("user", translator_prompt(text, source_language, target_language));
        let response = self.complete(request).await?;
        Self::extract_text(&response)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{MAX_OUTPUT_TOKENS, TRANSLATION_TEMPERATURE, Translator, client_build_error, missing_content, send_json};
use crate::errors::ProviderError;
use crate::translation::prompts::translator_prompt;

const PROVIDER_NAME: &str = "OpenAI";

/// OpenAI client for the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Bearer token
    api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model identifier
    model: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAIMessage>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender
    #[serde(default)]
    pub role: String,
    /// Message text
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices
    pub choices: Vec<OpenAIChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The assistant message
    pub message: OpenAIMessage,
}

impl OpenAIRequest {
    /// Create a request with the fixed translation sampling settings
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TRANSLATION_TEMPERATURE,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client whose requests time out after `timeout`
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

    /// Complete a chat request
    pub async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        debug!("POST {} (model {})", api_url, request.model);

        let builder = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request);

        send_json(PROVIDER_NAME, builder).await
    }

    /// Extract the assistant text from `choices[0].message.content`
    pub fn extract_text(response: &OpenAIResponse) -> Result<String, ProviderError> {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| missing_content(PROVIDER_NAME, "choices[0].message.content"))
    }
}

#[async_trait]
impl Translator for OpenAI {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = OpenAIRequest::new(&self.model)
            .add_message("user", translator_prompt(text, source_language, target_language));
        let response = self.complete(request).await?;
        Self::extract_text(&response)
    }
}

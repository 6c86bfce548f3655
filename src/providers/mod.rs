/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM backends:
 * - OpenAI: hosted chat completions
 * - Anthropic: hosted messages
 * - Ollama: local generation server
 *
 * All of them implement `Translator`, so the orchestrator never knows which backend
 * is active. `create_translator` picks the variant once per run.
 */

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use log::error;
use serde::de::DeserializeOwned;

use crate::app_config::{ProviderSettings, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Fixed sampling temperature for hosted chat completions
pub const TRANSLATION_TEMPERATURE: f32 = 0.1;

/// Fixed output bound for hosted providers
pub const MAX_OUTPUT_TOKENS: u32 = 4000;

/// Common trait for all translation backends
///
/// This trait defines the single operation the pipeline needs, allowing backends to be
/// used interchangeably behind an `Arc<dyn Translator>`.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Provider display name, used in logs and errors
    fn name(&self) -> &str;

    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text, trimmed, or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the translator for the active provider configuration
pub fn create_translator(settings: &ProviderSettings) -> Result<Arc<dyn Translator>, ProviderError> {
    let translator: Arc<dyn Translator> = match settings.kind {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            settings.api_key.clone(),
            settings.endpoint.clone(),
            settings.model.clone(),
            settings.timeout,
        )?),
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            settings.api_key.clone(),
            settings.endpoint.clone(),
            settings.model.clone(),
            settings.timeout,
        )?),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(
            settings.endpoint.clone(),
            settings.model.clone(),
            settings.timeout,
        )?),
    };
    Ok(translator)
}

/// A client that cannot be built is fatal: falling back would drop the request timeout
pub(crate) fn client_build_error(provider: &str, error: reqwest::Error) -> ProviderError {
    ProviderError::RequestFailed {
        provider: provider.to_string(),
        message: format!("unable to build HTTP client: {}", error),
    }
}

/// Send a prepared request and decode a successful JSON body
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::RequestFailed {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| ProviderError::RequestFailed {
        provider: provider.to_string(),
        message: format!("failed to read response body: {}", e),
    })?;

    parse_response(provider, status, &body)
}

/// Map a raw HTTP outcome to a typed body.
///
/// Non-2xx statuses become `ProviderError::Api` carrying the raw body; 2xx bodies
/// that do not deserialize become `ProviderError::UnexpectedResponse`.
pub fn parse_response<T: DeserializeOwned>(provider: &str, status: u16, body: &str) -> Result<T, ProviderError> {
    if !(200..300).contains(&status) {
        error!("{} API error ({}): {}", provider, status, body);
        return Err(ProviderError::Api {
            provider: provider.to_string(),
            status_code: status,
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| ProviderError::UnexpectedResponse {
        provider: provider.to_string(),
        detail: e.to_string(),
    })
}

/// Error for a well-formed body that lacks the translated text
pub(crate) fn missing_content(provider: &str, what: &str) -> ProviderError {
    ProviderError::UnexpectedResponse {
        provider: provider.to_string(),
        detail: format!("missing {}", what),
    }
}

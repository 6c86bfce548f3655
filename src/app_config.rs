//! Application configuration module
//! This module loads the project's `comply.yml`, and resolves the translation block and
//! the provider environment into the settings one pipeline run uses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ConfigError;
use crate::language_utils;

/// Default project configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "comply.yml";

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Anthropic API key
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the Ollama base URL
pub const OLLAMA_URL_VAR: &str = "OLLAMA_URL";
/// Environment variable overriding the default Ollama model
pub const OLLAMA_MODEL_VAR: &str = "OLLAMA_MODEL";

/// Represents the project configuration (`comply.yml`).
///
/// Keys this crate does not use (tickets, approvals, ...) are ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Organisation name
    #[serde(default)]
    pub name: String,

    /// Prefix of rendered output file names
    #[serde(default, rename = "filePrefix")]
    pub file_prefix: String,

    /// Directory receiving rendered artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Translation block, absent when translation was never configured
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
}

/// The `translation` block of `comply.yml`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Master switch
    #[serde(default)]
    pub enabled: bool,

    /// Target language tags (`es`, `pt-BR`, ...)
    #[serde(default)]
    pub languages: Vec<String>,

    /// Provider kind: openai, anthropic or ollama
    #[serde(default)]
    pub provider: String,

    /// Model identifier; empty means the provider default
    #[serde(default)]
    pub model: String,

    /// Language the sources are written in
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// How documents are sent to the provider when rendering
    #[serde(default)]
    pub mode: TranslationMode,

    /// Upper bound on batch units (format x language) running at once
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,

    /// Endpoint override for the provider (self-hosted gateways, tests)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// LaTeX template used for PDF output
    #[serde(default = "default_pandoc_template")]
    pub pandoc_template: PathBuf,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            languages: Vec::new(),
            provider: String::new(),
            model: String::new(),
            source_language: default_source_language(),
            mode: TranslationMode::default(),
            max_concurrent_batches: default_max_concurrent_batches(),
            endpoint: None,
            pandoc_template: default_pandoc_template(),
        }
    }
}

/// Document translation strategy for the rendering path
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// One structured-prompt call per document, followed by response cleanup
    #[default]
    Direct,
    /// One call per translatable segment; preserved segments never leave the process
    Sectioned,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// OpenAI chat completions
    OpenAI,
    /// Anthropic messages
    Anthropic,
    /// Ollama local generation
    Ollama,
}

impl TranslationProvider {
    /// Capitalized provider name, used in logs and errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Whether the backend runs on the local machine
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama)
    }

    /// Per-request HTTP timeout
    pub fn request_timeout(&self) -> Duration {
        if self.is_local() {
            Duration::from_secs(LOCAL_TIMEOUT_SECS)
        } else {
            Duration::from_secs(HOSTED_TIMEOUT_SECS)
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Fully resolved provider configuration; exactly one is active per run
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Backend kind
    pub kind: TranslationProvider,
    /// Model identifier
    pub model: String,
    /// API key (empty for Ollama)
    pub api_key: String,
    /// Base URL of the API
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Resolve a provider from its kind string, an optional model and the environment.
    ///
    /// `env` returns the value of an environment variable, or `None` when unset or empty.
    pub fn resolve(
        kind: &str,
        model: &str,
        endpoint_override: Option<&str>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let kind: TranslationProvider = kind.parse()?;

        let model = if model.trim().is_empty() {
            match kind {
                TranslationProvider::OpenAI => default_openai_model(),
                TranslationProvider::Anthropic => default_anthropic_model(),
                TranslationProvider::Ollama => {
                    env(OLLAMA_MODEL_VAR).unwrap_or_else(default_ollama_model)
                }
            }
        } else {
            model.trim().to_string()
        };

        let api_key = match kind {
            TranslationProvider::OpenAI => env(OPENAI_API_KEY_VAR).unwrap_or_default(),
            TranslationProvider::Anthropic => env(ANTHROPIC_API_KEY_VAR).unwrap_or_default(),
            TranslationProvider::Ollama => String::new(),
        };

        let endpoint = match endpoint_override.filter(|e| !e.trim().is_empty()) {
            Some(endpoint) => endpoint.trim().to_string(),
            None => match kind {
                TranslationProvider::OpenAI => default_openai_endpoint(),
                TranslationProvider::Anthropic => default_anthropic_endpoint(),
                TranslationProvider::Ollama => {
                    env(OLLAMA_URL_VAR).unwrap_or_else(default_ollama_endpoint)
                }
            },
        };
        Url::parse(&endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        debug!("Resolved provider {} with model {} at {}", kind.display_name(), model, endpoint);

        Ok(Self {
            kind,
            model,
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: kind.request_timeout(),
        })
    }
}

/// Everything a translation run needs, resolved from `comply.yml`, the command line and
/// the environment
#[derive(Debug, Clone)]
pub struct ResolvedTranslation {
    /// Target languages, in configuration order
    pub languages: Vec<String>,
    /// Source language tag
    pub source_language: String,
    /// Active provider
    pub provider: ProviderSettings,
    /// Rendering-path strategy
    pub mode: TranslationMode,
    /// Bound on concurrently running batch units
    pub max_concurrent_batches: usize,
    /// LaTeX template for PDF output
    pub pandoc_template: PathBuf,
}

impl ProjectConfig {
    /// Load and parse a `comply.yml`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Load { message, .. } => ConfigError::Load {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            message: e.to_string(),
        })
    }

    /// True when a translation block exists and is switched on
    pub fn translation_enabled(&self) -> bool {
        self.translation.as_ref().is_some_and(|t| t.enabled)
    }

    /// Languages of an enabled translation block, empty otherwise
    pub fn translation_languages(&self) -> &[String] {
        match &self.translation {
            Some(t) if t.enabled => &t.languages,
            _ => &[],
        }
    }

    /// Resolve the translation settings for a run.
    ///
    /// `provider_override` comes from the command line and wins over the configured
    /// provider. When it names a different backend, the configured model is not carried
    /// over and neither is the configured endpoint; the backend defaults apply instead.
    pub fn resolve_translation(
        &self,
        provider_override: Option<&str>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ResolvedTranslation, ConfigError> {
        let translation = match &self.translation {
            Some(t) if t.enabled => t,
            _ => return Err(ConfigError::TranslationDisabled),
        };

        if translation.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        for language in &translation.languages {
            language_utils::validate_language_tag(language)?;
        }
        language_utils::validate_language_tag(&translation.source_language)?;

        let configured = translation.provider.trim();
        let endpoint = translation.endpoint.as_deref();
        let (provider, model, endpoint) = match provider_override.map(str::trim).filter(|p| !p.is_empty()) {
            Some(over) if !over.eq_ignore_ascii_case(configured) => (over, "", None),
            Some(over) => (over, translation.model.as_str(), endpoint),
            None => (configured, translation.model.as_str(), endpoint),
        };
        if provider.is_empty() {
            return Err(ConfigError::NoProvider);
        }

        let provider = ProviderSettings::resolve(provider, model, endpoint, env)?;

        Ok(ResolvedTranslation {
            languages: translation.languages.clone(),
            source_language: translation.source_language.clone(),
            provider,
            mode: translation.mode,
            max_concurrent_batches: translation.max_concurrent_batches.max(1),
            pandoc_template: translation.pandoc_template.clone(),
        })
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            file_prefix: String::new(),
            output_dir: default_output_dir(),
            log_level: None,
            translation: None,
        }
    }
}

/// Read an environment variable, treating empty values as unset
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

const HOSTED_TIMEOUT_SECS: u64 = 60;
const LOCAL_TIMEOUT_SECS: u64 = 120;

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_max_concurrent_batches() -> usize {
    2
}

fn default_pandoc_template() -> PathBuf {
    PathBuf::from("templates/default.latex")
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_ollama_model() -> String {
    "llama3:8b".to_string()
}

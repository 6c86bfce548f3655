/*!
 * Error types for the comply-i18n pipeline.
 *
 * Each seam of the pipeline has its own error enum, built with the thiserror crate.
 * `TranslationError` is the contextual wrapper used by the orchestrator: it names the
 * document, template file or language that failed so the final message is actionable.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving the active configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `translation` block is missing or `enabled: false`
    #[error("translation not enabled in comply.yml")]
    TranslationDisabled,

    /// The language list is empty
    #[error("no languages configured for translation")]
    NoLanguages,

    /// Neither the configuration nor the command line named a provider
    #[error("no translation provider specified")]
    NoProvider,

    /// The provider kind string does not match any known backend
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// A configured language tag is malformed
    #[error("invalid language tag: {0}")]
    InvalidLanguage(String),

    /// An endpoint could not be parsed as a URL
    #[error("invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// The offending endpoint
        endpoint: String,
        /// Parser message
        message: String,
    },

    /// The configuration file could not be read or parsed
    #[error("unable to load configuration {path:?}: {message}")]
    Load {
        /// Configuration file path
        path: PathBuf,
        /// Underlying reason
        message: String,
    },
}

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status
    #[error("{provider} API request failed ({status_code}): {body}")]
    Api {
        /// Provider display name
        provider: String,
        /// HTTP status code
        status_code: u16,
        /// Raw response body
        body: String,
    },

    /// The provider answered 2xx but the body did not have the expected shape
    #[error("unexpected response format from {provider}: {detail}")]
    UnexpectedResponse {
        /// Provider display name
        provider: String,
        /// What was wrong with the body
        detail: String,
    },

    /// The request never produced a response (connection refused, timeout, ...)
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        /// Provider display name
        provider: String,
        /// Transport error message
        message: String,
    },
}

impl ProviderError {
    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Errors raised by the external document renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// Format string is neither pdf nor html
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The renderer binary could not be started
    #[error("unable to start {tool}: {message}")]
    ToolUnavailable {
        /// Binary name
        tool: String,
        /// Spawn error
        message: String,
    },

    /// The renderer ran and exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        /// Binary name
        tool: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// Filesystem error around the render step
    #[error("render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the translation pipeline, wrapped with the context that failed
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A document of a rendering batch failed at a given stage
    #[error("unable to translate document '{document}' ({stage}): {source}")]
    Document {
        /// Document display name
        document: String,
        /// Pipeline stage that failed
        stage: Stage,
        /// Underlying error
        #[source]
        source: Box<TranslationError>,
    },

    /// A template could not be translated to a language
    #[error("failed to translate {file:?} to {language}: {source}")]
    Template {
        /// Template path
        file: PathBuf,
        /// Target language tag
        language: String,
        /// Underlying error
        #[source]
        source: Box<TranslationError>,
    },

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider problem
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Renderer problem
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Document frontmatter is missing or malformed
    #[error("invalid frontmatter in {path:?}: {message}")]
    Frontmatter {
        /// Source document path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Filesystem problem on a known path
    #[error("{action} {path:?}: {source}")]
    Io {
        /// What was being attempted
        action: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl TranslationError {
    /// Build an I/O error for a path
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Wrap with the document and stage that failed
    pub fn in_document(self, document: impl Into<String>, stage: Stage) -> Self {
        Self::Document {
            document: document.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// Wrap with the template file and language that failed
    pub fn in_template(self, file: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self::Template {
            file: file.into(),
            language: language.into(),
            source: Box::new(self),
        }
    }

    /// Innermost provider error, if the failure came from a provider
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            Self::Document { source, .. } | Self::Template { source, .. } => source.provider_error(),
            _ => None,
        }
    }

    /// True when the root cause is a configuration problem
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Document { source, .. } | Self::Template { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

/// Pipeline stage names used in error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Read,
    Translate,
    Write,
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Preprocess => "preprocess",
            Self::Read => "read",
            Self::Translate => "translate",
            Self::Write => "write",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation pipeline
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Convenience alias for pipeline results
pub type TranslationResult<T> = Result<T, TranslationError>;

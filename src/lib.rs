/*!
 * # comply-i18n - structure-preserving translation of compliance documents
 *
 * A Rust library that translates compliance policies, procedures and narratives with
 * LLM providers without corrupting YAML metadata, tables, code blocks or template
 * variables.
 *
 * ## Features
 *
 * - Translate documents using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 * - Section classification keeps metadata and tabular content byte-for-byte
 * - Language-tagged sibling templates (`access.pt-BR.md`)
 * - Translated PDF/HTML rendering through pandoc, bounded concurrency per format and language
 * - Incremental runs driven by file modification times
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: `comply.yml` loading and provider resolution
 * - `filename`: language tags in file names
 * - `document`: documents, the filesystem source and the preprocessor
 * - `translation`: the pipeline:
 *   - `translation::segments`: section classifier
 *   - `translation::orchestrator`: per-document translate-and-render
 *   - `translation::batch`: batch drivers
 *   - `translation::templates`: template translation
 * - `render`: output formats and the pandoc renderer
 * - `providers`: client implementations for the LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod filename;
pub mod language_utils;
pub mod providers;
pub mod render;
pub mod translation;

pub use app_config::{ProjectConfig, TranslationMode, TranslationProvider};
pub use document::{Document, DocumentKind, DocumentSource, FsDocumentSource};
pub use errors::{AppError, ConfigError, ProviderError, RenderError, TranslationError};
pub use language_utils::get_language_name;
pub use providers::{Translator, create_translator};
pub use render::{OutputFormat, PandocRenderer, Renderer};

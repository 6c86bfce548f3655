/*!
 * Per-document translation for the rendering path.
 *
 * `DocumentTranslator` owns everything one batch unit needs: the provider, the
 * renderer, the preprocessor, the section classifier and the staleness tracker of
 * that unit. A document goes through claim -> preprocess -> read -> translate ->
 * write -> render; intermediate markdown is held by scope guards so it is removed
 * whether the document succeeds or fails.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::app_config::TranslationMode;
use crate::document::{Document, MarkdownPreprocessor, Preprocessor};
use crate::errors::{ProviderError, Stage, TranslationError, TranslationResult};
use crate::file_utils::{FileManager, ScratchFile};
use crate::filename::{intermediate_names, rendered_artifact_name};
use crate::providers::Translator;
use crate::render::{OutputFormat, Renderer};

use super::prompts::{clean_document_response, structured_document_prompt};
use super::segments::{LineClassifier, SectionClassifier, join_segments};
use super::staleness::StalenessTracker;

/// What happened to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Already processed at this or a later modification time
    Skipped,
    /// Artifact written to this path
    Rendered(PathBuf),
}

/// Translates and renders documents for one (format, language) unit
pub struct DocumentTranslator {
    provider: Arc<dyn Translator>,
    renderer: Arc<dyn Renderer>,
    preprocessor: Arc<dyn Preprocessor>,
    classifier: Arc<dyn SectionClassifier>,
    tracker: StalenessTracker,
    mode: TranslationMode,
    source_language: String,
}

impl DocumentTranslator {
    /// Create a translator with the markdown preprocessor, the line classifier and
    /// direct mode from English
    pub fn new(provider: Arc<dyn Translator>, renderer: Arc<dyn Renderer>, tracker: StalenessTracker) -> Self {
        Self {
            provider,
            renderer,
            preprocessor: Arc::new(MarkdownPreprocessor),
            classifier: Arc::new(LineClassifier),
            tracker,
            mode: TranslationMode::Direct,
            source_language: "en".to_string(),
        }
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn SectionClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The tracker shared by this unit
    pub fn tracker(&self) -> &StalenessTracker {
        &self.tracker
    }

    /// Translate markdown content to `target_language` according to the active mode.
    ///
    /// Content without any translatable segment is returned unchanged and the provider
    /// is not called.
    pub async fn translate_content(&self, content: &str, target_language: &str) -> Result<String, ProviderError> {
        if !self.classifier.has_translatable(content) {
            debug!("Nothing to translate, copying content verbatim");
            return Ok(content.to_string());
        }

        match self.mode {
            TranslationMode::Direct => {
                let prompt = structured_document_prompt(content, target_language);
                let response = self
                    .provider
                    .translate(&prompt, &self.source_language, target_language)
                    .await?;
                Ok(clean_document_response(&response))
            }
            TranslationMode::Sectioned => {
                let segments = self.classifier.classify(content);
                let mut parts = Vec::with_capacity(segments.len());
                for segment in &segments {
                    if segment.is_translatable() {
                        let translated = self
                            .provider
                            .translate(&segment.text, &self.source_language, target_language)
                            .await?;
                        parts.push(translated);
                    } else {
                        parts.push(segment.text.clone());
                    }
                }
                Ok(join_segments(parts.iter().map(String::as_str)))
            }
        }
    }

    /// Translate one document and render it as `<stem>_<language>.<ext>` in `output_dir`
    pub async fn translate_for_rendering(
        &self,
        document: &Document,
        output_dir: &Path,
        target_language: &str,
        format: OutputFormat,
    ) -> TranslationResult<RenderOutcome> {
        if !self.tracker.claim(&document.full_path, document.modified_at) {
            return Ok(RenderOutcome::Skipped);
        }

        let fail = |stage: Stage| move |e: TranslationError| e.in_document(document.name.as_str(), stage);

        FileManager::ensure_dir(output_dir)
            .map_err(|e| TranslationError::io("unable to create", output_dir, e))
            .map_err(fail(Stage::Preprocess))?;

        let (preprocessed_name, translated_name) =
            intermediate_names(&document.output_filename, target_language, format);

        let preprocessed = ScratchFile::new(output_dir.join(preprocessed_name));
        self.preprocessor
            .preprocess(document, preprocessed.path())
            .map_err(fail(Stage::Preprocess))?;

        let content = FileManager::read_to_string(preprocessed.path())
            .map_err(|e| TranslationError::io("unable to read", preprocessed.path(), e))
            .map_err(fail(Stage::Read))?;

        info!("Translating {} to {}...", document.name, target_language);
        let translated_content = self
            .translate_content(&content, target_language)
            .await
            .map_err(TranslationError::from)
            .map_err(fail(Stage::Translate))?;

        let translated = ScratchFile::new(output_dir.join(translated_name));
        FileManager::write_to_file(translated.path(), &translated_content)
            .map_err(|e| TranslationError::io("unable to write", translated.path(), e))
            .map_err(fail(Stage::Write))?;

        let artifact = output_dir.join(rendered_artifact_name(&document.output_filename, target_language, format));
        self.renderer
            .render(translated.path(), &artifact, format)
            .await
            .map_err(TranslationError::from)
            .map_err(fail(Stage::Render))?;

        info!(
            "{} -> {} ({})",
            relative_to_cwd(&document.full_path).display(),
            artifact.display(),
            target_language
        );
        Ok(RenderOutcome::Rendered(artifact))
    }
}

fn relative_to_cwd(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}

/*!
 * Translation of raw source templates into tagged siblings.
 *
 * Unlike the rendering path, templates are translated in place: `policies/access.md`
 * produces `policies/access.es.md` next to it. A target that is at least as recent as
 * its source is left alone, so re-running the command only pays for edited files.
 * The run is sequential and stops at the first failure.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::app_config::{ProjectConfig, ProviderSettings, ResolvedTranslation};
use crate::document::DocumentKind;
use crate::errors::{TranslationError, TranslationResult};
use crate::file_utils::FileManager;
use crate::filename::{is_tagged, tag_path};
use crate::providers::{Translator, create_translator};

use super::prompts::{clean_document_response, structured_document_prompt};

/// Outcome of a template translation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TemplateReport {
    /// Targets written in this run
    pub generated: Vec<PathBuf>,
    /// Targets already up to date
    pub skipped: Vec<PathBuf>,
}

impl TemplateReport {
    /// True when no eligible file was found
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.skipped.is_empty()
    }
}

/// A template is a markdown file that is neither a README/TODO nor already tagged
pub fn is_template_file(path: &Path) -> bool {
    let Some(filename) = path.file_name().map(|f| f.to_string_lossy()) else {
        return false;
    };
    if filename.starts_with("README") || filename.starts_with("TODO") {
        return false;
    }
    filename.ends_with(".md") && !is_tagged(&filename)
}

/// Resolve the templates to translate.
///
/// With `path`, a directory is searched recursively and a file must itself be a
/// template. Without it, the three document directories under `root` are searched;
/// missing ones are skipped.
pub fn collect_templates(root: &Path, path: Option<&Path>) -> TranslationResult<Vec<PathBuf>> {
    let Some(path) = path else {
        let mut files = Vec::new();
        for kind in DocumentKind::ALL {
            let dir = root.join(kind.directory());
            if !FileManager::dir_exists(&dir) {
                debug!("Skipping missing directory {:?}", dir);
                continue;
            }
            files.extend(templates_below(&dir)?);
        }
        return Ok(files);
    };

    if FileManager::dir_exists(path) {
        templates_below(path)
    } else if FileManager::file_exists(path) {
        if is_template_file(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(TranslationError::io(
                "file is not a translatable template",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a template"),
            ))
        }
    } else {
        Err(TranslationError::io(
            "path does not exist",
            path,
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ))
    }
}

fn templates_below(dir: &Path) -> TranslationResult<Vec<PathBuf>> {
    let files = FileManager::find_files(dir, "md").map_err(|e| TranslationError::io("error walking", dir, e))?;
    Ok(files.into_iter().filter(|f| is_template_file(f)).collect())
}

/// True when `target` exists and is at least as recent as `source`
pub fn is_up_to_date(source: &Path, target: &Path) -> bool {
    let modified = |p: &Path| -> Option<SystemTime> { FileManager::modified_time(p).ok() };
    match (modified(source), modified(target)) {
        (Some(source_time), Some(target_time)) => target_time >= source_time,
        _ => false,
    }
}

/// Translates templates to every configured language
pub struct TemplateTranslator {
    provider: Arc<dyn Translator>,
    languages: Vec<String>,
    source_language: String,
    show_progress: bool,
}

impl TemplateTranslator {
    pub fn new(provider: Arc<dyn Translator>, languages: Vec<String>) -> Self {
        Self {
            provider,
            languages,
            source_language: "en".to_string(),
            show_progress: false,
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    /// Draw a progress bar on stderr
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Translate every file to every language, files outer, stopping at the first error
    pub async fn translate_files(&self, files: &[PathBuf]) -> TranslationResult<TemplateReport> {
        let mut report = TemplateReport::default();
        if files.is_empty() {
            info!("No files to translate");
            return Ok(report);
        }

        info!(
            "Translating {} files to languages: {}",
            files.len(),
            self.languages.join(", ")
        );

        let progress = self.progress_bar((files.len() * self.languages.len()) as u64);

        for file in files {
            for language in &self.languages {
                progress.set_message(format!("{} ({})", file.display(), language));
                let target = tag_path(file, language);

                if is_up_to_date(file, &target) {
                    info!("Skipping {} (translation is up to date)", target.display());
                    report.skipped.push(target);
                } else {
                    self.translate_one(file, &target, language)
                        .await
                        .map_err(|e| e.in_template(file, language.as_str()))?;
                    info!("Generated: {}", target.display());
                    report.generated.push(target);
                }
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        info!("Template translation completed successfully");
        Ok(report)
    }

    async fn translate_one(&self, file: &Path, target: &Path, language: &str) -> TranslationResult<()> {
        let content = FileManager::read_to_string(file).map_err(|e| TranslationError::io("unable to read", file, e))?;

        info!("Translating {} to {}...", file.display(), language);
        let prompt = structured_document_prompt(&content, language);
        let response = self
            .provider
            .translate(&prompt, &self.source_language, language)
            .await?;

        FileManager::write_to_file(target, &clean_document_response(&response))
            .map_err(|e| TranslationError::io("unable to write", target, e))
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} templates {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar
    }
}

/// Translate the templates under `path` (or all template directories under `root`)
/// with the provider named by `provider_override` or the configuration.
///
/// Configuration is resolved before anything is read, so a disabled or incomplete
/// translation block fails without touching the filesystem.
pub async fn translate_templates(
    config: &ProjectConfig,
    root: &Path,
    path: Option<&Path>,
    provider_override: Option<&str>,
    env: &dyn Fn(&str) -> Option<String>,
    show_progress: bool,
) -> TranslationResult<TemplateReport> {
    let resolved: ResolvedTranslation = config.resolve_translation(provider_override, env)?;
    let provider = create_translator(&resolved.provider)?;
    run_templates(provider, &resolved, root, path, show_progress).await
}

/// Same as [`translate_templates`] with an already built provider
pub async fn run_templates(
    provider: Arc<dyn Translator>,
    resolved: &ResolvedTranslation,
    root: &Path,
    path: Option<&Path>,
    show_progress: bool,
) -> TranslationResult<TemplateReport> {
    log_provider(&resolved.provider);
    let files = collect_templates(root, path)?;
    TemplateTranslator::new(provider, resolved.languages.clone())
        .with_source_language(resolved.source_language.clone())
        .with_progress(show_progress)
        .translate_files(&files)
        .await
}

fn log_provider(settings: &ProviderSettings) {
    debug!(
        "Using {} ({}) at {}",
        settings.kind.display_name(),
        settings.model,
        settings.endpoint
    );
}

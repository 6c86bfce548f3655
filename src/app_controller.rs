//! Application controller for the translation commands

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::app_config::{ProjectConfig, ResolvedTranslation, process_env};
use crate::document::FsDocumentSource;
use crate::errors::{AppError, TranslationError};
use crate::providers::{Translator, create_translator};
use crate::render::{OutputFormat, PandocRenderer, Renderer};
use crate::translation::batch::{BatchDriver, BatchSummary};
use crate::translation::templates::{TemplateReport, run_templates};

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Main application controller: turns a loaded configuration into pipeline runs
pub struct Controller {
    /// Project configuration
    config: ProjectConfig,
    /// Project root holding policies/, procedures/, narratives/
    root: PathBuf,
    /// Environment lookup, the process environment outside tests
    env: Box<EnvLookup>,
    /// Draw progress bars
    show_progress: bool,
}

impl Controller {
    /// Create a controller reading the process environment
    pub fn with_config(config: ProjectConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            env: Box::new(process_env),
            show_progress: false,
        }
    }

    /// Replace the environment lookup
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Resolve languages and provider for a run
    pub fn resolve(&self, provider_override: Option<&str>) -> Result<ResolvedTranslation, AppError> {
        Ok(self.config.resolve_translation(provider_override, &*self.env)?)
    }

    /// `translate-templates [PATH] [--provider NAME]`
    pub async fn translate_templates(
        &self,
        path: Option<&Path>,
        provider_override: Option<&str>,
    ) -> Result<TemplateReport, AppError> {
        let resolved = self.resolve(provider_override)?;
        let provider = create_translator(&resolved.provider).map_err(TranslationError::from)?;
        self.translate_templates_with(provider, &resolved, path).await
    }

    /// Template translation with an already built provider
    pub async fn translate_templates_with(
        &self,
        provider: Arc<dyn Translator>,
        resolved: &ResolvedTranslation,
        path: Option<&Path>,
    ) -> Result<TemplateReport, AppError> {
        let start = Instant::now();
        let report = run_templates(provider, resolved, &self.root, path, self.show_progress).await?;
        debug!("Template translation took {:?}", start.elapsed());
        Ok(report)
    }

    /// `render-translated [--format FORMAT] [--output DIR]`
    pub async fn render_translated(
        &self,
        formats: &[OutputFormat],
        output_dir: Option<&Path>,
        provider_override: Option<&str>,
    ) -> Result<BatchSummary, AppError> {
        let resolved = self.resolve(provider_override)?;
        let provider = create_translator(&resolved.provider).map_err(TranslationError::from)?;
        let renderer = Arc::new(PandocRenderer::new(self.root.join(&resolved.pandoc_template)));
        self.render_translated_with(provider, renderer, &resolved, formats, output_dir)
            .await
    }

    /// Translated rendering with an already built provider and renderer
    pub async fn render_translated_with(
        &self,
        provider: Arc<dyn Translator>,
        renderer: Arc<dyn Renderer>,
        resolved: &ResolvedTranslation,
        formats: &[OutputFormat],
        output_dir: Option<&Path>,
    ) -> Result<BatchSummary, AppError> {
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.root.join(&self.config.output_dir),
        };

        let prefix = Some(self.config.file_prefix.clone()).filter(|p| !p.is_empty());
        let source = FsDocumentSource::new(&self.root, prefix).with_translations(resolved.languages.clone());

        info!(
            "Rendering translated documents to {} for {}",
            output_dir.display(),
            resolved.languages.join(", ")
        );

        let summary = BatchDriver::new(Arc::new(source), provider, renderer, output_dir)
            .configured(resolved)
            .run_all(formats, &resolved.languages)
            .await?;
        Ok(summary)
    }
}

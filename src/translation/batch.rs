/*!
 * Batch drivers for translated rendering.
 *
 * A batch unit is one (format, language) pair. Inside a unit, policies, procedures and
 * narratives are processed one document at a time in listing order, and the unit
 * stops at its first failing document. Units are independent: they run concurrently
 * up to a configured bound, each with its own staleness tracker, and every unit is
 * awaited before the aggregate result is reported.
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::{error, info};

use crate::app_config::{ResolvedTranslation, TranslationMode};
use crate::document::{DocumentKind, DocumentSource};
use crate::errors::TranslationResult;
use crate::providers::Translator;
use crate::render::{OutputFormat, Renderer};

use super::orchestrator::{DocumentTranslator, RenderOutcome};
use super::staleness::StalenessTracker;

/// Aggregate result of one or more batch units
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Artifacts written, in unit then listing order
    pub rendered: Vec<PathBuf>,
    /// Documents skipped as already processed
    pub skipped: usize,
}

impl BatchSummary {
    fn merge(&mut self, other: BatchSummary) {
        self.rendered.extend(other.rendered);
        self.skipped += other.skipped;
    }
}

/// Drives translated rendering over every document collection
pub struct BatchDriver {
    source: Arc<dyn DocumentSource>,
    provider: Arc<dyn Translator>,
    renderer: Arc<dyn Renderer>,
    output_dir: PathBuf,
    source_language: String,
    mode: TranslationMode,
    max_concurrent_batches: usize,
}

impl BatchDriver {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        provider: Arc<dyn Translator>,
        renderer: Arc<dyn Renderer>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            provider,
            renderer,
            output_dir: output_dir.into(),
            source_language: "en".to_string(),
            mode: TranslationMode::Direct,
            max_concurrent_batches: 2,
        }
    }

    /// Apply source language, mode and concurrency bound from a resolved configuration
    pub fn configured(mut self, resolved: &ResolvedTranslation) -> Self {
        self.source_language = resolved.source_language.clone();
        self.mode = resolved.mode;
        self.max_concurrent_batches = resolved.max_concurrent_batches.max(1);
        self
    }

    pub fn with_max_concurrent_batches(mut self, max: usize) -> Self {
        self.max_concurrent_batches = max.max(1);
        self
    }

    /// Translated PDF batch for one language
    pub async fn pdf_translated(&self, language: &str) -> TranslationResult<BatchSummary> {
        self.run_unit(OutputFormat::Pdf, language).await
    }

    /// Translated HTML batch for one language
    pub async fn html_translated(&self, language: &str) -> TranslationResult<BatchSummary> {
        self.run_unit(OutputFormat::Html, language).await
    }

    /// Run one unit with a fresh staleness tracker
    pub async fn run_unit(&self, format: OutputFormat, language: &str) -> TranslationResult<BatchSummary> {
        info!("Generating translated {} documents ({})...", format.extension().to_uppercase(), language);

        let translator = DocumentTranslator::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.renderer),
            StalenessTracker::new(),
        )
        .with_mode(self.mode)
        .with_source_language(self.source_language.clone());

        let mut summary = BatchSummary::default();
        for kind in DocumentKind::ALL {
            for document in self.source.originals(kind)? {
                match translator
                    .translate_for_rendering(&document, &self.output_dir, language, format)
                    .await?
                {
                    RenderOutcome::Rendered(path) => summary.rendered.push(path),
                    RenderOutcome::Skipped => summary.skipped += 1,
                }
            }
        }
        Ok(summary)
    }

    /// Run every (format, language) unit.
    ///
    /// All units are awaited. If any failed, the error of the first failing unit in
    /// (format, language) order is returned.
    pub async fn run_all(&self, formats: &[OutputFormat], languages: &[String]) -> TranslationResult<BatchSummary> {
        let units: Vec<(OutputFormat, &str)> = formats
            .iter()
            .flat_map(|format| languages.iter().map(move |language| (*format, language.as_str())))
            .collect();
        let total = units.len();

        let mut results = stream::iter(units.into_iter().enumerate())
            .map(|(index, (format, language))| async move {
                let start = Instant::now();
                let result = self.run_unit(format, language).await;
                match &result {
                    Ok(summary) => info!(
                        "{} batch ({}) completed in {:?}: {} rendered, {} skipped",
                        format,
                        language,
                        start.elapsed(),
                        summary.rendered.len(),
                        summary.skipped
                    ),
                    Err(e) => error!("{} batch ({}) failed: {}", format, language, e),
                }
                (index, result)
            })
            .buffer_unordered(self.max_concurrent_batches)
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut summary = BatchSummary::default();
        let mut first_error = None;
        for (_, result) in results {
            match result {
                Ok(unit) => summary.merge(unit),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("{} translated batch units completed", total);
                Ok(summary)
            }
        }
    }
}

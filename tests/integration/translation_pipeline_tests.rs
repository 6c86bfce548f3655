/*!
 * Translate-for-rendering and batch driver tests
 */

use std::sync::Arc;

use async_trait::async_trait;

use comply_i18n::app_config::TranslationMode;
use comply_i18n::document::{Document, DocumentKind, DocumentSource, FsDocumentSource};
use comply_i18n::errors::{ProviderError, Stage, TranslationError};
use comply_i18n::providers::Translator;
use comply_i18n::providers::mock::MockProvider;
use comply_i18n::render::OutputFormat;
use comply_i18n::translation::{BatchDriver, DocumentTranslator, RenderOutcome, StalenessTracker};

use crate::common::{self, RecordingRenderer};

fn load_access_policy(dir: &std::path::Path) -> Document {
    let source = FsDocumentSource::new(dir, None);
    source.originals(DocumentKind::Policy).unwrap().remove(0)
}

/// Fails every request for one target language
#[derive(Debug)]
struct FailsForLanguage {
    language: &'static str,
    inner: MockProvider,
}

#[async_trait]
impl Translator for FailsForLanguage {
    fn name(&self) -> &str {
        "Flaky"
    }

    fn model(&self) -> &str {
        "flaky-1"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        if target == self.language {
            return Err(ProviderError::Api {
                provider: "Flaky".to_string(),
                status_code: 503,
                body: "overloaded".to_string(),
            });
        }
        self.inner.translate(text, source, target).await
    }
}

#[tokio::test]
async fn test_translate_for_rendering_withAccessPolicy_shouldRenderTaggedArtifactAndKeepMetadata() {
    common::init_test_logging();
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let document = load_access_policy(project.path());
    let provider = MockProvider::working();
    let renderer = RecordingRenderer::new();
    let translator =
        DocumentTranslator::new(Arc::new(provider.clone()), Arc::new(renderer.clone()), StalenessTracker::new());

    let outcome = translator
        .translate_for_rendering(&document, &output, "es", OutputFormat::Pdf)
        .await
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered(output.join("access_es.pdf")));
    assert_eq!(provider.request_count(), 1);

    let calls = renderer.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.format, OutputFormat::Pdf);
    assert_eq!(call.output, output.join("access_es.pdf"));
    assert!(call.input.starts_with(&output));
    assert!(call.content.starts_with("---\nname: Access Policy [es]\nacronym: AP\nsatisfies:\n  TSC:\n    - CC6.1\n"));
    assert!(call.content.contains("# Purpose [es]\na. text. [es]"));
    assert!(call.content.contains("| TSC | CC6.1, CC6.2 |"));

    // only the rendered artifact survives
    assert_eq!(common::list_file_names(&output), vec!["access_es.pdf"]);
}

#[tokio::test]
async fn test_translate_for_rendering_withPreservedOnlyDocument_shouldRenderInputVerbatim() {
    let project = common::create_temp_dir().unwrap();
    let body = "---\nname: Data Map\nacronym: DM\n---\n\n| System | Owner |\n|--------|-------|\n| CRM | Sales |\n\n```\nschema: v1\n```\n";
    common::create_test_file(project.path(), "narratives/datamap.md", body).unwrap();
    let document = FsDocumentSource::new(project.path(), None)
        .originals(DocumentKind::Narrative)
        .unwrap()
        .remove(0);

    for mode in [TranslationMode::Direct, TranslationMode::Sectioned] {
        let provider = MockProvider::working();
        let renderer = RecordingRenderer::new();
        let translator =
            DocumentTranslator::new(Arc::new(provider.clone()), Arc::new(renderer.clone()), StalenessTracker::new())
                .with_mode(mode);

        translator
            .translate_for_rendering(&document, &project.path().join("out"), "de", OutputFormat::Html)
            .await
            .unwrap();

        assert_eq!(provider.request_count(), 0);
        assert_eq!(renderer.calls()[0].content, body);
    }
}

#[tokio::test]
async fn test_translate_for_rendering_withSameDocumentTwice_shouldSkipSecondTime() {
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let document = load_access_policy(project.path());
    let provider = MockProvider::working();
    let tracker = StalenessTracker::new();
    let translator =
        DocumentTranslator::new(Arc::new(provider.clone()), Arc::new(RecordingRenderer::new()), tracker.clone());

    let first = translator.translate_for_rendering(&document, &output, "es", OutputFormat::Pdf).await.unwrap();
    let second = translator.translate_for_rendering(&document, &output, "es", OutputFormat::Pdf).await.unwrap();

    assert!(matches!(first, RenderOutcome::Rendered(_)));
    assert_eq!(second, RenderOutcome::Skipped);
    assert_eq!(provider.request_count(), 1);
    assert!(!tracker.is_newer(&document.full_path, document.modified_at));
}

#[tokio::test]
async fn test_translate_for_rendering_withProviderFailure_shouldWrapStageAndCleanUp() {
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let document = load_access_policy(project.path());
    let renderer = RecordingRenderer::new();
    let translator = DocumentTranslator::new(
        Arc::new(MockProvider::failing(401, "{\"error\":\"invalid_api_key\"}")),
        Arc::new(renderer.clone()),
        StalenessTracker::new(),
    );

    let err = translator
        .translate_for_rendering(&document, &output, "es", OutputFormat::Pdf)
        .await
        .unwrap_err();

    match &err {
        TranslationError::Document { document, stage, .. } => {
            assert_eq!(document, "Access Policy");
            assert_eq!(*stage, Stage::Translate);
        }
        other => panic!("expected document error, got {:?}", other),
    }
    assert_eq!(err.provider_error().and_then(|e| e.status_code()), Some(401));
    assert!(renderer.calls().is_empty());
    assert!(common::list_file_names(&output).is_empty());
}

#[tokio::test]
async fn test_translate_for_rendering_withRendererFailure_shouldRemoveIntermediates() {
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let document = load_access_policy(project.path());
    let renderer = RecordingRenderer::failing();
    let translator =
        DocumentTranslator::new(Arc::new(MockProvider::working()), Arc::new(renderer.clone()), StalenessTracker::new());

    let err = translator
        .translate_for_rendering(&document, &output, "fr", OutputFormat::Pdf)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Document { stage: Stage::Render, .. }));
    assert!(err.to_string().contains("Error producing PDF."));
    // the renderer saw the translated intermediate, which is gone now
    assert_eq!(renderer.calls().len(), 1);
    assert!(!renderer.calls()[0].input.exists());
    assert!(common::list_file_names(&output).is_empty());
}

#[tokio::test]
async fn test_batch_driver_withTwoFormatsAndLanguages_shouldRenderEveryUnit() {
    let project = common::create_test_project().unwrap();
    common::create_test_file(project.path(), "policies/access.es.md", common::ACCESS_POLICY).unwrap();
    let output = project.path().join("output");
    let provider = MockProvider::working();
    let source = FsDocumentSource::new(project.path(), None).with_translations(vec!["es".to_string()]);

    let driver = BatchDriver::new(
        Arc::new(source),
        Arc::new(provider.clone()),
        Arc::new(RecordingRenderer::new()),
        &output,
    )
    .with_max_concurrent_batches(3);

    let summary = driver
        .run_all(&OutputFormat::ALL, &["es".to_string(), "de".to_string()])
        .await
        .unwrap();

    assert_eq!(summary.rendered.len(), 12);
    assert_eq!(summary.skipped, 0);
    assert_eq!(provider.request_count(), 12);
    assert_eq!(
        summary.rendered[..3],
        [output.join("access_es.pdf"), output.join("patch_es.pdf"), output.join("system_es.pdf")]
    );
    assert_eq!(summary.rendered[11], output.join("system_de.html"));

    let mut expected: Vec<String> = Vec::new();
    for stem in ["access", "patch", "system"] {
        for lang in ["de", "es"] {
            for ext in ["html", "pdf"] {
                expected.push(format!("{}_{}.{}", stem, lang, ext));
            }
        }
    }
    expected.sort();
    assert_eq!(common::list_file_names(&output), expected);
}

#[tokio::test]
async fn test_batch_driver_withFailingLanguage_shouldFinishOtherUnitsAndReportError() {
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let provider = FailsForLanguage {
        language: "de",
        inner: MockProvider::working(),
    };

    let driver = BatchDriver::new(
        Arc::new(FsDocumentSource::new(project.path(), None)),
        Arc::new(provider),
        Arc::new(RecordingRenderer::new()),
        &output,
    );

    let err = driver
        .run_all(&[OutputFormat::Html], &["de".to_string(), "es".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Document { stage: Stage::Translate, .. }));
    assert!(err.to_string().contains("overloaded"));
    assert_eq!(
        common::list_file_names(&output),
        vec!["access_es.html", "patch_es.html", "system_es.html"]
    );
}

#[tokio::test]
async fn test_pdf_translated_withPrefix_shouldUsePrefixedStem() {
    let project = common::create_test_project().unwrap();
    let output = project.path().join("output");
    let driver = BatchDriver::new(
        Arc::new(FsDocumentSource::new(project.path(), Some("Acme".to_string()))),
        Arc::new(MockProvider::working()),
        Arc::new(RecordingRenderer::new()),
        &output,
    );

    let summary = driver.pdf_translated("pt-BR").await.unwrap();

    assert_eq!(summary.rendered[0], output.join("Acme-access_pt-BR.pdf"));
    assert_eq!(driver.html_translated("pt-BR").await.unwrap().rendered.len(), 3);
}

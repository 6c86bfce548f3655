/*!
 * Tests for error messages and context wrapping
 */

use std::error::Error;

use comply_i18n::errors::{AppError, ConfigError, ProviderError, RenderError, Stage, TranslationError};

fn unauthorized() -> ProviderError {
    ProviderError::Api {
        provider: "OpenAI".to_string(),
        status_code: 401,
        body: "{\"error\":\"invalid_api_key\"}".to_string(),
    }
}

#[test]
fn test_provider_error_withApiFailure_shouldNameProviderStatusAndBody() {
    let err = unauthorized();
    assert_eq!(
        err.to_string(),
        "OpenAI API request failed (401): {\"error\":\"invalid_api_key\"}"
    );
    assert_eq!(err.status_code(), Some(401));
}

#[test]
fn test_in_document_withProviderFailure_shouldKeepRootCause() {
    let err = TranslationError::from(unauthorized()).in_document("Access Policy", Stage::Translate);

    let message = err.to_string();
    assert!(message.contains("Access Policy"));
    assert!(message.contains("translate"));
    assert!(message.contains("invalid_api_key"));
    assert_eq!(err.provider_error().and_then(|e| e.status_code()), Some(401));
    assert!(err.source().is_some());
}

#[test]
fn test_in_template_withConfigFailure_shouldReportConfig() {
    let err = TranslationError::from(ConfigError::NoLanguages).in_template("policies/access.md", "es");

    assert!(err.is_config());
    assert!(err.to_string().contains("access.md"));
    assert!(err.to_string().contains("es"));
}

#[test]
fn test_render_error_withFailedTool_shouldIncludeStderr() {
    let err = RenderError::Failed {
        tool: "pandoc".to_string(),
        status: "exit status: 43".to_string(),
        stderr: "Error producing PDF.".to_string(),
    };
    assert_eq!(err.to_string(), "pandoc exited with exit status: 43: Error producing PDF.");
}

#[test]
fn test_app_error_conversions_shouldPreserveMessages() {
    let app: AppError = ConfigError::TranslationDisabled.into();
    assert_eq!(app.to_string(), "Configuration error: translation not enabled in comply.yml");

    let app: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(app, AppError::Unknown(ref m) if m == "boom"));

    let app: AppError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
    assert!(matches!(app, AppError::File(_)));
}

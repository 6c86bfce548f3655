/*!
 * Provider request/response handling, exercised against a local stub server
 */

use std::time::Duration;

use comply_i18n::app_config::ProviderSettings;
use comply_i18n::errors::ProviderError;
use comply_i18n::providers::anthropic::Anthropic;
use comply_i18n::providers::ollama::Ollama;
use comply_i18n::providers::openai::OpenAI;
use comply_i18n::providers::{Translator, create_translator, parse_response};

use crate::common::stub_server::{StubServer, unused_local_url};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_openai_translate_withSuccess_shouldSendChatRequestAndTrimContent() {
    let server = StubServer::start(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"  Hola mundo \n"}}]}"#,
    )
    .await;
    let provider = OpenAI::new("sk-test", &server.url, "gpt-4", TIMEOUT).unwrap();

    let result = provider.translate("Hello world", "en", "es").await.unwrap();

    assert_eq!(result, "Hola mundo");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));

    let body = request.json();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["max_tokens"], 4000);
    assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "user");
    let content = body["messages"][0]["content"].as_str().unwrap();
    assert!(content.contains("from English (en) to Spanish (es)"));
    assert!(content.ends_with("Hello world"));
}

#[tokio::test]
async fn test_openai_translate_withUnauthorized_shouldCarryStatusAndBody() {
    let server = StubServer::start(401, r#"{"error":{"code":"invalid_api_key"}}"#).await;
    let provider = OpenAI::new("bad", &server.url, "gpt-4", TIMEOUT).unwrap();

    let err = provider.translate("Hello", "en", "es").await.unwrap_err();

    match &err {
        ProviderError::Api {
            provider,
            status_code,
            body,
        } => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(*status_code, 401);
            assert!(body.contains("invalid_api_key"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_translate_withEmptyChoices_shouldReportUnexpectedResponse() {
    let server = StubServer::start(200, r#"{"choices":[]}"#).await;
    let provider = OpenAI::new("sk-test", &server.url, "gpt-4", TIMEOUT).unwrap();

    let err = provider.translate("Hello", "en", "es").await.unwrap_err();

    assert!(matches!(err, ProviderError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn test_anthropic_translate_withSuccess_shouldSendVersionHeaderAndReadContentArray() {
    let server = StubServer::start(
        200,
        r#"{"id":"msg_1","content":[{"type":"text","text":"Bonjour"}],"usage":{"input_tokens":10,"output_tokens":2}}"#,
    )
    .await;
    let provider = Anthropic::new("sk-ant", &server.url, "claude-3-5-sonnet-20241022", TIMEOUT).unwrap();

    let result = provider.translate("Hello", "en", "fr").await.unwrap();

    assert_eq!(result, "Bonjour");
    let request = &server.requests()[0];
    assert_eq!(request.path, "/v1/messages");
    assert_eq!(request.header("x-api-key"), Some("sk-ant"));
    assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));
    assert_eq!(request.header("authorization"), None);

    let body = request.json();
    assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
    assert_eq!(body["max_tokens"], 4000);
    assert!(body.get("temperature").is_none());
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("to French (fr)"));
}

#[tokio::test]
async fn test_anthropic_translate_withWrongShape_shouldReportUnexpectedResponse() {
    let server = StubServer::start(200, r#"{"completion":"Bonjour"}"#).await;
    let provider = Anthropic::new("sk-ant", &server.url, "claude", TIMEOUT).unwrap();

    let err = provider.translate("Hello", "en", "fr").await.unwrap_err();

    assert!(matches!(err, ProviderError::UnexpectedResponse { ref provider, .. } if provider == "Anthropic"));
}

#[tokio::test]
async fn test_ollama_translate_withSuccess_shouldPostNonStreamingGenerate() {
    let server = StubServer::start(200, r#"{"model":"llama3:8b","response":" Hallo ","done":true}"#).await;
    let provider = Ollama::new(&server.url, "llama3:8b", TIMEOUT).unwrap();

    let result = provider.translate("Hello", "en", "de").await.unwrap();

    assert_eq!(result, "Hallo");
    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/generate");
    assert_eq!(request.header("authorization"), None);

    let body = request.json();
    assert_eq!(body["model"], "llama3:8b");
    assert_eq!(body["stream"], false);
    assert!(body["prompt"].as_str().unwrap().contains("to German (de)"));
}

#[tokio::test]
async fn test_ollama_translate_withServerError_shouldReturnApiError() {
    let server = StubServer::start(500, "model not found").await;
    let provider = Ollama::new(&server.url, "missing", TIMEOUT).unwrap();

    let err = provider.translate("Hello", "en", "de").await.unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("model not found"));
}

#[tokio::test]
async fn test_translate_withNothingListening_shouldReturnRequestFailed() {
    let url = unused_local_url().await;
    let provider = Ollama::new(&url, "llama3:8b", TIMEOUT).unwrap();

    let err = provider.translate("Hello", "en", "de").await.unwrap_err();

    assert!(matches!(err, ProviderError::RequestFailed { .. }));
}

#[tokio::test]
async fn test_translate_withUnresponsiveServer_shouldHonourClientTimeout() {
    let server = StubServer::silent().await;
    let provider = OpenAI::new("sk-test", &server.url, "gpt-4", Duration::from_millis(200)).unwrap();

    let started = std::time::Instant::now();
    let err = provider.translate("Hello", "en", "es").await.unwrap_err();

    assert!(matches!(err, ProviderError::RequestFailed { ref provider, .. } if provider == "OpenAI"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_parse_response_withStatusRange_shouldOnlyAcceptSuccess() {
    let ok: Result<serde_json::Value, _> = parse_response("X", 204, "{}");
    assert!(ok.is_ok());

    let err = parse_response::<serde_json::Value>("X", 429, "slow down").unwrap_err();
    assert_eq!(err.status_code(), Some(429));

    let err = parse_response::<serde_json::Value>("X", 200, "not json").unwrap_err();
    assert!(matches!(err, ProviderError::UnexpectedResponse { .. }));
}

#[test]
fn test_create_translator_withEachKind_shouldSelectVariant() {
    let no_env = |_: &str| -> Option<String> { None };
    for (kind, name, model) in [
        ("openai", "OpenAI", "gpt-4"),
        ("Anthropic", "Anthropic", "claude-3-5-sonnet-20241022"),
        ("OLLAMA", "Ollama", "llama3:8b"),
    ] {
        let settings = ProviderSettings::resolve(kind, "", None, &no_env).unwrap();
        let translator = create_translator(&settings).unwrap();
        assert_eq!(translator.name(), name);
        assert_eq!(translator.model(), model);
    }
}

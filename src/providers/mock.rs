/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Behaves like a well-instructed model: translatable lines are
 *   tagged with the target language, structure is left alone
 * - `MockProvider::echo()` - Returns its input unchanged
 * - `MockProvider::failing(status, body)` - Always fails with an API error
 * - `MockProvider::chatty()` - Prepends boilerplate before a working translation
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::Translator;

const DOCUMENT_MARKER: &str = "**Input document:**\n";
const TARGET_MARKER: &str = "\n\n**Target language:**";

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Tags translatable lines with `[lang]`
    Working,
    /// Returns the input unchanged
    Echo,
    /// Working, with chatter in front of the answer
    Chatty,
    /// Always fails with the given status and body
    Failing { status_code: u16, body: String },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that prepends boilerplate to its answers
    pub fn chatty() -> Self {
        Self::new(MockBehavior::Chatty)
    }

    /// Create a failing mock provider that always errors
    pub fn failing(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(MockBehavior::Failing {
            status_code,
            body: body.into(),
        })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// The document embedded in a structured prompt, or the whole text
    pub fn document_from_prompt(text: &str) -> &str {
        let Some(start) = text.find(DOCUMENT_MARKER) else {
            return text;
        };
        let rest = &text[start + DOCUMENT_MARKER.len()..];
        match rest.rfind(TARGET_MARKER) {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    /// Fake translation: prose lines and `name`/`comment` metadata values get a `[lang]`
    /// suffix; delimiters, tables, code blocks and other metadata stay as they are.
    pub fn tag_translatable_lines(text: &str, target_language: &str) -> String {
        let mut in_frontmatter = false;
        let mut in_code = false;
        let mut seen_content = false;

        text.split('\n')
            .map(|line| {
                let trimmed = line.trim();
                if trimmed == "---" {
                    in_frontmatter = !seen_content && !in_frontmatter;
                    seen_content = true;
                    return line.to_string();
                }
                if !trimmed.is_empty() {
                    seen_content = true;
                }
                if trimmed.starts_with("```") {
                    in_code = !in_code;
                    return line.to_string();
                }

                let keep = if in_frontmatter {
                    !(trimmed.starts_with("name:") || trimmed.starts_with("comment:"))
                } else {
                    in_code
                        || trimmed.is_empty()
                        || trimmed.starts_with('|')
                        || trimmed.starts_with('%')
                        || trimmed.starts_with("Table:")
                };

                if keep {
                    line.to_string()
                } else {
                    format!("{} [{}]", line, target_language)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn respond(&self, request: &MockRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }
        let payload = Self::document_from_prompt(&request.text);
        Self::tag_translatable_lines(payload, &request.target_language)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Translator for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(self.respond(&request)),

            MockBehavior::Echo => Ok(text.to_string()),

            MockBehavior::Chatty => Ok(format!("Sure! Here you go.\n\n{}", self.respond(&request))),

            MockBehavior::Failing { status_code, body } => Err(ProviderError::Api {
                provider: "Mock".to_string(),
                status_code: *status_code,
                body: body.clone(),
            }),
        }
    }
}

//! The language model seam.
//!
//! Every generation step is a [`GatewayRequest`]: a [`TaskKind`] plus a
//! structured JSON payload. Implementations of [`LanguageModel`] turn a
//! request into text; the pipeline decides what the text means.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use snippetlab_core::Snippet;

use crate::error::GatewayError;

/// The generation tasks the pipeline issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Code,
    Title,
    DetectLanguage,
    Tests,
    CodeFromFeedback,
    TestsFromFeedback,
    Regenerate,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Code => "code",
            TaskKind::Title => "title",
            TaskKind::DetectLanguage => "detect_language",
            TaskKind::Tests => "tests",
            TaskKind::CodeFromFeedback => "code_from_feedback",
            TaskKind::TestsFromFeedback => "tests_from_feedback",
            TaskKind::Regenerate => "regenerate",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayRequest {
    pub kind: TaskKind,
    pub payload: Value,
}

impl GatewayRequest {
    /// Code from a natural-language description.
    pub fn code(description: &str) -> Self {
        Self {
            kind: TaskKind::Code,
            payload: json!({ "description": description }),
        }
    }

    /// A short title for freshly generated code.
    pub fn title(description: &str, code: &str) -> Self {
        Self {
            kind: TaskKind::Title,
            payload: json!({ "description": description, "code": code }),
        }
    }

    /// The language tag of freshly generated code.
    pub fn detect_language(description: &str, code: &str) -> Self {
        Self {
            kind: TaskKind::DetectLanguage,
            payload: json!({ "description": description, "code": code }),
        }
    }

    /// Tests for the snippet's current code.
    pub fn tests(snippet: &Snippet) -> Self {
        Self {
            kind: TaskKind::Tests,
            payload: json!({
                "description": snippet.description,
                "language": language_of(snippet),
                "code": snippet.code,
                "code_feedback": snippet.code_feedback,
            }),
        }
    }

    /// A revision of the code driven by user feedback.
    pub fn code_from_feedback(snippet: &Snippet, feedback: &str) -> Self {
        Self {
            kind: TaskKind::CodeFromFeedback,
            payload: json!({
                "description": snippet.description,
                "language": language_of(snippet),
                "code": snippet.code,
                "feedback": feedback,
            }),
        }
    }

    /// A revision of the tests driven by user feedback.
    pub fn tests_from_feedback(snippet: &Snippet, feedback: &str) -> Self {
        Self {
            kind: TaskKind::TestsFromFeedback,
            payload: json!({
                "description": snippet.description,
                "language": language_of(snippet),
                "code": snippet.code,
                "code_feedback": snippet.code_feedback,
                "test_code": snippet.test_code,
                "feedback": feedback,
            }),
        }
    }

    /// A repair of the code driven by a failed test run.
    pub fn regenerate(snippet: &Snippet, error_message: &str) -> Self {
        Self {
            kind: TaskKind::Regenerate,
            payload: json!({
                "description": snippet.description,
                "language": language_of(snippet),
                "code": snippet.code,
                "code_feedback": snippet.code_feedback,
                "test_code": snippet.test_code,
                "test_feedback": snippet.test_feedback,
                "error_message": error_message,
            }),
        }
    }
}

fn language_of(snippet: &Snippet) -> Option<&'static str> {
    snippet.language.map(|language| language.as_str())
}

/// A text generator for pipeline tasks.
///
/// Implementations must not interpret or validate payload fields beyond what
/// they need to build a prompt; feedback text in particular is forwarded
/// untouched.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GatewayRequest) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use snippetlab_storage::{InMemoryStore, SnippetStore};

    #[test]
    fn task_kind_serializes_as_tag() {
        assert_eq!(
            serde_json::to_value(TaskKind::CodeFromFeedback).unwrap(),
            json!("code_from_feedback")
        );
        assert_eq!(TaskKind::DetectLanguage.to_string(), "detect_language");
    }

    #[test]
    fn description_is_forwarded_verbatim() {
        let request = GatewayRequest::code(" a  description ");
        assert_eq!(request.payload["description"], " a  description ");
    }

    #[test]
    fn feedback_is_forwarded_byte_for_byte() {
        let snippet = InMemoryStore::new().create().unwrap();
        let feedback = "  型ヒントを追加して\n« добавь тесты 🧪 ";

        for request in [
            GatewayRequest::code_from_feedback(&snippet, feedback),
            GatewayRequest::tests_from_feedback(&snippet, feedback),
        ] {
            let forwarded = request.payload["feedback"].as_str().unwrap();
            assert_eq!(forwarded.as_bytes(), feedback.as_bytes(), "{}", request.kind);
        }
    }
}

//! Read-side rendering of a snippet.
//!
//! [`SnippetView`] is what callers see: the run is the effective run checked
//! against the current code and tests, and the affordances are derived at
//! the moment the view is built. Both the HTTP and CLI surfaces render
//! through it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::SnippetId;
use crate::language::Language;
use crate::run::{RunOutcome, RunStatus};
use crate::snippet::{ExecutionState, Snippet};

/// The last run as seen against the snippet's current code and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunView {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full view of one snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnippetView {
    pub id: SnippetId,
    pub title: String,
    pub description: String,
    pub language: Option<Language>,
    pub code: String,
    pub test_code: String,
    pub code_feedback: String,
    pub test_feedback: String,
    pub last_run: RunView,
    /// Eligible language with both code and tests present.
    pub runnable: bool,
    pub regenerate_enabled: bool,
    pub execution_state: ExecutionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Snippet> for SnippetView {
    fn from(snippet: &Snippet) -> Self {
        let run = snippet.effective_run();
        let last_run = RunView {
            status: run.status(),
            outcome: run.result().map(|result| result.outcome),
            message: run.result().map(|result| result.message.clone()),
        };
        SnippetView {
            id: snippet.id,
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            language: snippet.language,
            code: snippet.code.clone(),
            test_code: snippet.test_code.clone(),
            code_feedback: snippet.code_feedback.clone(),
            test_feedback: snippet.test_feedback.clone(),
            last_run,
            runnable: snippet.is_runnable(),
            regenerate_enabled: run.regenerate_enabled(),
            execution_state: snippet.execution_state(),
            created_at: snippet.created_at,
            updated_at: snippet.updated_at,
        }
    }
}

impl From<Snippet> for SnippetView {
    fn from(snippet: Snippet) -> Self {
        SnippetView::from(&snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::run::{RunResult, RunState};

    fn failed_against(code: &str, test_code: &str) -> Snippet {
        let now = Utc::now();
        Snippet {
            id: SnippetId(3),
            title: "Adder".into(),
            description: "add".into(),
            language: Some(Language::Python),
            code: "def add(a, b): return a + b".into(),
            test_code: "assert add(1, 2) == 3".into(),
            code_feedback: String::new(),
            test_feedback: String::new(),
            last_run: RunState::Completed(RunResult {
                outcome: RunOutcome::Fail,
                message: "AssertionError".into(),
                fingerprint: Fingerprint::of(code, test_code),
            }),
            created_order: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn current_failure_enables_regenerate() {
        let view =
            SnippetView::from(failed_against("def add(a, b): return a + b", "assert add(1, 2) == 3"));
        assert_eq!(view.last_run.status, RunStatus::Fail);
        assert_eq!(view.last_run.message.as_deref(), Some("AssertionError"));
        assert!(view.regenerate_enabled);
        assert!(view.runnable);
    }

    #[test]
    fn failure_against_older_artifacts_renders_stale() {
        let view = SnippetView::from(failed_against("old", "old"));
        assert_eq!(view.last_run.status, RunStatus::Stale);
        assert_eq!(view.last_run.outcome, Some(RunOutcome::Fail));
        assert!(!view.regenerate_enabled);
        assert_eq!(view.execution_state, ExecutionState::Stale);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["last_run"]["status"], "stale");
        assert_eq!(json["regenerate_enabled"], false);
    }
}

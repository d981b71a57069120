//! The snippet entity and its derived execution state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::id::SnippetId;
use crate::language::Language;
use crate::run::{RunOutcome, RunState};

/// A generated piece of code plus its metadata, tests and last run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    /// Short human-readable title; empty until generated.
    pub title: String,
    /// The user's natural-language task.
    pub description: String,
    /// Detected or set language; `None` until the first detection.
    pub language: Option<Language>,
    pub code: String,
    pub test_code: String,
    /// Last feedback submitted against the code.
    pub code_feedback: String,
    /// Last feedback submitted against the tests.
    pub test_feedback: String,
    pub last_run: RunState,
    /// Insertion-order token for stable listing.
    pub created_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a snippet stands with respect to test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// No language yet, or a highlight-only language.
    Ineligible,
    /// Executable language, but code or tests are still empty.
    Incomplete,
    /// Ready to run, never run.
    Unexecuted,
    /// Ran before, but code or tests changed since.
    Stale,
    ExecutedPass,
    ExecutedFail,
    ExecutedError,
}

impl Snippet {
    /// Fingerprint of the current code/tests pair.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.code, &self.test_code)
    }

    /// The stored run state, checked against the current artifacts.
    pub fn effective_run(&self) -> RunState {
        if self.code.is_empty() {
            return RunState::NotRun;
        }
        self.last_run.clone().against(self.fingerprint())
    }

    /// Whether the sandbox accepts this snippet's language.
    pub fn is_eligible(&self) -> bool {
        self.language.is_some_and(Language::is_executable)
    }

    /// Eligible and both artifacts present.
    pub fn is_runnable(&self) -> bool {
        self.is_eligible() && !self.code.is_empty() && !self.test_code.is_empty()
    }

    /// Derived on every call from the effective run state.
    pub fn regenerate_enabled(&self) -> bool {
        self.effective_run().regenerate_enabled()
    }

    pub fn execution_state(&self) -> ExecutionState {
        if !self.is_eligible() {
            return ExecutionState::Ineligible;
        }
        if !self.is_runnable() {
            return ExecutionState::Incomplete;
        }
        match self.effective_run() {
            RunState::NotRun => ExecutionState::Unexecuted,
            RunState::Stale(_) => ExecutionState::Stale,
            RunState::Completed(result) => match result.outcome {
                RunOutcome::Pass => ExecutionState::ExecutedPass,
                RunOutcome::Fail => ExecutionState::ExecutedFail,
                RunOutcome::Error => ExecutionState::ExecutedError,
            },
        }
    }
}

//! Storage-layer update type.
//!
//! [`SnippetPatch`] is the partial-field write accepted by
//! [`crate::SnippetStore::upsert_fields`]. `None` means "leave unchanged".

use chrono::{DateTime, Utc};
use snippetlab_core::{Language, RunState, Snippet};

/// A field-scoped update of one snippet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<Language>,
    pub code: Option<String>,
    pub test_code: Option<String>,
    pub code_feedback: Option<String>,
    pub test_feedback: Option<String>,
    /// Explicit run state. When absent, an artifact change invalidates the
    /// stored run instead.
    pub last_run: Option<RunState>,
}

impl SnippetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn test_code(mut self, test_code: impl Into<String>) -> Self {
        self.test_code = Some(test_code.into());
        self
    }

    pub fn code_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.code_feedback = Some(feedback.into());
        self
    }

    pub fn test_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.test_feedback = Some(feedback.into());
        self
    }

    pub fn last_run(mut self, state: RunState) -> Self {
        self.last_run = Some(state);
        self
    }

    /// True when the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        *self == SnippetPatch::default()
    }

    /// True when the patch names the code or tests. Whether they actually
    /// change depends on the stored values; see [`Self::changes_artifacts`].
    pub fn touches_artifacts(&self) -> bool {
        self.code.is_some() || self.test_code.is_some()
    }

    /// True when applying the patch would give `snippet` different code or
    /// tests. Re-saving identical text is not a change.
    pub fn changes_artifacts(&self, snippet: &Snippet) -> bool {
        self.code.as_deref().is_some_and(|code| code != snippet.code)
            || self
                .test_code
                .as_deref()
                .is_some_and(|test_code| test_code != snippet.test_code)
    }

    /// Applies the patch to a working copy.
    ///
    /// This is the reference semantics every backend reproduces:
    /// explicit fields are overwritten, an artifact change invalidates a
    /// completed run, and emptied code clears the run entirely.
    pub fn apply_to(&self, snippet: &mut Snippet, now: DateTime<Utc>) {
        let artifacts_changed = self.changes_artifacts(snippet);
        if let Some(title) = &self.title {
            snippet.title = title.clone();
        }
        if let Some(description) = &self.description {
            snippet.description = description.clone();
        }
        if let Some(language) = self.language {
            snippet.language = Some(language);
        }
        if let Some(code) = &self.code {
            snippet.code = code.clone();
        }
        if let Some(test_code) = &self.test_code {
            snippet.test_code = test_code.clone();
        }
        if let Some(feedback) = &self.code_feedback {
            snippet.code_feedback = feedback.clone();
        }
        if let Some(feedback) = &self.test_feedback {
            snippet.test_feedback = feedback.clone();
        }

        match &self.last_run {
            Some(state) => snippet.last_run = state.clone(),
            None if artifacts_changed => {
                snippet.last_run = std::mem::take(&mut snippet.last_run).invalidated();
            }
            None => {}
        }
        if snippet.code.is_empty() {
            snippet.last_run = RunState::NotRun;
        }

        if !self.is_empty() {
            snippet.updated_at = now;
        }
    }
}

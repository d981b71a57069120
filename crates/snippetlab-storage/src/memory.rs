//! In-memory implementation of [`SnippetStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests, ephemeral sessions,
//! and anywhere persistence isn't needed. It keeps snippets in an
//! insertion-ordered map with identical semantics to the SQLite backend.

use std::sync::Mutex;

use chrono::Utc;
use indexmap::IndexMap;

use snippetlab_core::{RunState, Snippet, SnippetId};

use crate::error::StorageError;
use crate::traits::SnippetStore;
use crate::types::SnippetPatch;

#[derive(Debug, Default)]
struct Inner {
    snippets: IndexMap<SnippetId, Snippet>,
    /// Last assigned ID. IDs are never reused, even after deletion.
    last_id: i64,
}

/// Insertion-ordered, mutex-guarded snippet store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl SnippetStore for InMemoryStore {
    fn create(&self) -> Result<Snippet, StorageError> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let id = SnippetId(inner.last_id);
        let now = Utc::now();
        let snippet = Snippet {
            id,
            title: String::new(),
            description: String::new(),
            language: None,
            code: String::new(),
            test_code: String::new(),
            code_feedback: String::new(),
            test_feedback: String::new(),
            last_run: RunState::NotRun,
            created_order: id.0,
            created_at: now,
            updated_at: now,
        };
        inner.snippets.insert(id, snippet.clone());
        Ok(snippet)
    }

    fn get(&self, id: SnippetId) -> Result<Snippet, StorageError> {
        self.lock()?
            .snippets
            .get(&id)
            .cloned()
            .ok_or(StorageError::SnippetNotFound(id))
    }

    fn upsert_fields(
        &self,
        id: SnippetId,
        patch: &SnippetPatch,
    ) -> Result<Snippet, StorageError> {
        let mut inner = self.lock()?;
        let snippet = inner
            .snippets
            .get_mut(&id)
            .ok_or(StorageError::SnippetNotFound(id))?;
        patch.apply_to(snippet, Utc::now());
        Ok(snippet.clone())
    }

    fn delete(&self, id: SnippetId) -> Result<(), StorageError> {
        self.lock()?
            .snippets
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(StorageError::SnippetNotFound(id))
    }

    fn list(&self) -> Result<Vec<Snippet>, StorageError> {
        Ok(self.lock()?.snippets.values().cloned().collect())
    }
}

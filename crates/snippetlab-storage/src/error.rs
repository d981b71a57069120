//! Storage error types for snippetlab-storage.
//!
//! [`StorageError`] covers all anticipated failure modes in the storage layer:
//! database and migration failures, missing snippets, and rows that no
//! longer decode into the core data model.

use snippetlab_core::SnippetId;
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An underlying SQLite call failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A snippet with the given ID was not found.
    #[error("snippet not found: {0}")]
    SnippetNotFound(SnippetId),

    /// A stored row could not be decoded.
    #[error("corrupt snippet {id}: {reason}")]
    Corrupt { id: SnippetId, reason: String },

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

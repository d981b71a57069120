//! The [`SnippetStore`] trait defining the storage contract for snippets.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, ensuring
//! they are fully swappable without changing the pipeline.

use snippetlab_core::{Snippet, SnippetId};

use crate::error::StorageError;
use crate::types::SnippetPatch;

/// The storage contract for snippets.
///
/// Methods take `&self`: backends synchronize internally so a single store
/// can be shared by concurrent pipeline operations. The trait is synchronous;
/// every call is a short local write, never an outbound network call.
pub trait SnippetStore: Send + Sync {
    /// Creates a new empty snippet and returns it with its assigned ID.
    fn create(&self) -> Result<Snippet, StorageError>;

    /// Retrieves a snippet by ID.
    fn get(&self, id: SnippetId) -> Result<Snippet, StorageError>;

    /// Applies a field-scoped patch atomically and returns the updated
    /// snippet.
    ///
    /// Only the fields present in `patch` are written. See
    /// [`SnippetPatch::apply_to`] for the run invalidation rule.
    fn upsert_fields(&self, id: SnippetId, patch: &SnippetPatch)
        -> Result<Snippet, StorageError>;

    /// Deletes a snippet.
    fn delete(&self, id: SnippetId) -> Result<(), StorageError>;

    /// Lists all snippets in insertion order.
    fn list(&self) -> Result<Vec<Snippet>, StorageError>;
}

//! Storage abstraction for snippets.
//!
//! Provides the [`SnippetStore`] trait defining the storage contract that all
//! backends implement, plus the [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Architecture
//!
//! The store exclusively owns persisted snippet state. Callers hold transient
//! working copies and write back through field-scoped patches
//! ([`SnippetPatch`]): each update names only the fields it changes, so two
//! writers touching different fields of the same snippet never lose each
//! other's work. Every backend applies the same invalidation rule: a patch
//! that changes `code` or `test_code` marks a completed run stale in the
//! same write.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: SnippetPatch, the field-scoped update
//! - [`traits`]: SnippetStore trait definition
//! - [`convert`]: RunState to/from flat column encoding
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation

pub mod convert;
pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::SnippetStore;
pub use types::SnippetPatch;

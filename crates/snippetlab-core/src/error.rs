//! Core error types for snippetlab-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! the parse failures of the core data model's text encodings.

use thiserror::Error;

/// Core errors produced by the snippetlab-core crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A language tag outside the supported vocabulary.
    #[error("unknown language: '{tag}'")]
    UnknownLanguage { tag: String },

    /// A run outcome tag other than pass/fail/error.
    #[error("unknown run outcome: '{tag}'")]
    UnknownRunOutcome { tag: String },

    /// A run status tag that does not decode to a [`crate::RunState`].
    #[error("invalid run state: {reason}")]
    InvalidRunState { reason: String },

    /// An artifact fingerprint that is not 64 hex characters.
    #[error("invalid fingerprint: '{value}'")]
    InvalidFingerprint { value: String },
}

//! Pipeline error types.
//!
//! [`PipelineError`] is the caller-facing taxonomy: validation and
//! precondition failures are raised before any external call; gateway and
//! execution failures carry the collaborator's error and a retryable flag.

use snippetlab_core::{Language, SnippetId};
use snippetlab_storage::StorageError;
use thiserror::Error;

use crate::gateway::TaskKind;

/// Failures of the language model collaborator.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection, DNS, TLS).
    #[error("language model request failed: {0}")]
    Transport(String),

    /// The model did not answer within the configured timeout.
    #[error("language model request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered, but not with usable text.
    #[error("malformed language model response: {0}")]
    Malformed(String),

    /// The model client is not configured correctly.
    #[error("language model misconfigured: {0}")]
    Config(String),
}

impl GatewayError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) | GatewayError::Timeout => true,
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Malformed(_) | GatewayError::Config(_) => false,
        }
    }
}

/// Failures of the execution sandbox collaborator.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The sandbox could not be started.
    #[error("sandbox unavailable: {0}")]
    Unavailable(String),

    /// The run exceeded its wall-clock limit and was killed.
    #[error("execution timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// The sandbox was asked to run a language it does not support.
    #[error("sandbox cannot execute {0}")]
    Unsupported(Language),

    #[error("sandbox i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`crate::SnippetService`] operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad caller input; rejected before any external call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Valid input, wrong snippet state; rejected before any external call.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The snippet's language is not sandbox-eligible.
    #[error("language '{}' does not support sandboxed execution", language_tag(.language))]
    UnsupportedLanguage { language: Option<Language> },

    /// The operation references an unknown snippet.
    #[error("snippet not found: {0}")]
    NotFound(SnippetId),

    /// The language model failed during the named step.
    #[error("{step} step failed: {source}")]
    Gateway {
        step: TaskKind,
        #[source]
        source: GatewayError,
    },

    /// The sandbox failed; the run was recorded with an `error` outcome.
    #[error("execution failed: {0}")]
    Execution(#[source] SandboxError),

    /// The store failed.
    #[error(transparent)]
    Storage(StorageError),
}

impl PipelineError {
    /// Whether the caller may usefully retry the same operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Gateway { source, .. } => source.is_retryable(),
            PipelineError::Execution(_) => true,
            _ => false,
        }
    }
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SnippetNotFound(id) => PipelineError::NotFound(id),
            other => PipelineError::Storage(other),
        }
    }
}

fn language_tag(language: &Option<Language>) -> &'static str {
    language.map(Language::as_str).unwrap_or("none")
}

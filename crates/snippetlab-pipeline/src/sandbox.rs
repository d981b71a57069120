//! The execution sandbox seam.

use async_trait::async_trait;
use serde::Serialize;

use snippetlab_core::{Language, RunOutcome};

use crate::error::SandboxError;

/// The outcome of one completed run.
///
/// A run that finishes with failing assertions is a verdict, not an error;
/// [`SandboxError`] is reserved for runs that could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxVerdict {
    pub outcome: RunOutcome,
    pub message: String,
}

impl SandboxVerdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome::Pass,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome::Fail,
            message: message.into(),
        }
    }
}

/// Runs test code against source code in isolation.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute(
        &self,
        language: Language,
        code: &str,
        test_code: &str,
    ) -> Result<SandboxVerdict, SandboxError>;
}

//! Flat column encoding of [`RunState`] and language tags.
//!
//! SQLite stores the run state as four columns (`run_status`, `run_outcome`,
//! `run_message`, `run_fingerprint`). These helpers are the only place that
//! knows the mapping in both directions.

use snippetlab_core::{CoreError, Fingerprint, Language, RunResult, RunState, RunStatus};

/// Column values for one [`RunState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunColumns {
    pub status: String,
    pub outcome: Option<String>,
    pub message: String,
    pub fingerprint: Option<String>,
}

/// Encodes a run state into its column values.
pub fn encode_run(state: &RunState) -> RunColumns {
    match state.result() {
        None => RunColumns {
            status: RunStatus::None.as_str().to_string(),
            outcome: None,
            message: String::new(),
            fingerprint: None,
        },
        Some(result) => RunColumns {
            status: state.status().as_str().to_string(),
            outcome: Some(result.outcome.as_str().to_string()),
            message: result.message.clone(),
            fingerprint: Some(result.fingerprint.to_hex()),
        },
    }
}

/// Decodes column values back into a run state.
pub fn decode_run(columns: RunColumns) -> Result<RunState, CoreError> {
    let status: RunStatus = columns.status.parse()?;
    if status == RunStatus::None {
        return Ok(RunState::NotRun);
    }

    let outcome = columns.outcome.ok_or_else(|| CoreError::InvalidRunState {
        reason: format!("status '{}' without an outcome", status),
    })?;
    let fingerprint = columns
        .fingerprint
        .ok_or_else(|| CoreError::InvalidRunState {
            reason: format!("status '{}' without a fingerprint", status),
        })?;
    let result = RunResult {
        outcome: outcome.parse()?,
        message: columns.message,
        fingerprint: fingerprint.parse::<Fingerprint>()?,
    };

    if status == RunStatus::Stale {
        Ok(RunState::Stale(result))
    } else if status == RunStatus::from(result.outcome) {
        Ok(RunState::Completed(result))
    } else {
        Err(CoreError::InvalidRunState {
            reason: format!(
                "status '{}' disagrees with outcome '{}'",
                status, result.outcome
            ),
        })
    }
}

/// Encodes an optional language as its tag, empty when unset.
pub fn encode_language(language: Option<Language>) -> &'static str {
    language.map(Language::as_str).unwrap_or("")
}

/// Decodes a stored language tag; empty means unset.
pub fn decode_language(tag: &str) -> Result<Option<Language>, CoreError> {
    if tag.is_empty() {
        Ok(None)
    } else {
        tag.parse().map(Some)
    }
}

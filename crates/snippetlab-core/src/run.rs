//! Test-run results and the per-snippet run state machine.
//!
//! [`RunState`] is the persisted form of a snippet's last run:
//!
//! - `NotRun`: no test execution has completed yet.
//! - `Completed`: the last run's outcome, still describing the current
//!   code and tests.
//! - `Stale`: a run exists but the code or tests changed after it. The
//!   previous result is kept for display; it never drives regeneration.
//!
//! The regenerate affordance is derived from this state on every read and is
//! never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fingerprint::Fingerprint;

/// Outcome of one sandbox execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Tests ran and passed.
    Pass,
    /// Tests ran and at least one assertion or the code itself failed.
    Fail,
    /// The sandbox could not produce a verdict (timeout, crash, unavailable).
    Error,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Pass => "pass",
            RunOutcome::Fail => "fail",
            RunOutcome::Error => "error",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunOutcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(RunOutcome::Pass),
            "fail" => Ok(RunOutcome::Fail),
            "error" => Ok(RunOutcome::Error),
            other => Err(CoreError::UnknownRunOutcome {
                tag: other.to_string(),
            }),
        }
    }
}

/// A completed run: outcome, diagnostic text, and what it ran against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub outcome: RunOutcome,
    /// Diagnostic message, surfaced verbatim.
    pub message: String,
    /// Fingerprint of the code/tests the sandbox executed.
    pub fingerprint: Fingerprint,
}

/// Flat status tag of a [`RunState`], as stored and as shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    None,
    Pass,
    Fail,
    Error,
    Stale,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::None => "none",
            RunStatus::Pass => "pass",
            RunStatus::Fail => "fail",
            RunStatus::Error => "error",
            RunStatus::Stale => "stale",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RunStatus::None),
            "pass" => Ok(RunStatus::Pass),
            "fail" => Ok(RunStatus::Fail),
            "error" => Ok(RunStatus::Error),
            "stale" => Ok(RunStatus::Stale),
            other => Err(CoreError::InvalidRunState {
                reason: format!("unknown run status '{}'", other),
            }),
        }
    }
}

impl From<RunOutcome> for RunStatus {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Pass => RunStatus::Pass,
            RunOutcome::Fail => RunStatus::Fail,
            RunOutcome::Error => RunStatus::Error,
        }
    }
}

/// The last-run state of a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotRun,
    Completed(RunResult),
    Stale(RunResult),
}

impl RunState {
    pub fn status(&self) -> RunStatus {
        match self {
            RunState::NotRun => RunStatus::None,
            RunState::Completed(result) => result.outcome.into(),
            RunState::Stale(_) => RunStatus::Stale,
        }
    }

    /// The last run's result, current or stale.
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            RunState::NotRun => None,
            RunState::Completed(result) | RunState::Stale(result) => Some(result),
        }
    }

    /// The state after the code or tests changed.
    ///
    /// A completed run becomes stale; `NotRun` and `Stale` are unchanged.
    pub fn invalidated(self) -> RunState {
        match self {
            RunState::Completed(result) => RunState::Stale(result),
            other => other,
        }
    }

    /// The state as seen against the snippet's current artifacts.
    ///
    /// A completed result recorded for different code/tests is stale even if
    /// nobody marked it so (a run that finished after a concurrent edit).
    pub fn against(self, current: Fingerprint) -> RunState {
        match self {
            RunState::Completed(result) if result.fingerprint != current => {
                RunState::Stale(result)
            }
            other => other,
        }
    }

    /// Regeneration is offered iff the current run did not pass.
    pub fn regenerate_enabled(&self) -> bool {
        matches!(
            self,
            RunState::Completed(RunResult {
                outcome: RunOutcome::Fail | RunOutcome::Error,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn completed(outcome: RunOutcome, code: &str) -> RunState {
        RunState::Completed(RunResult {
            outcome,
            message: format!("{} message", outcome),
            fingerprint: Fingerprint::of(code, "assert True"),
        })
    }

    #[test]
    fn not_run_stays_not_run_when_invalidated() {
        assert_eq!(RunState::NotRun.invalidated(), RunState::NotRun);
    }

    #[test]
    fn completed_becomes_stale_and_keeps_result() {
        let state = completed(RunOutcome::Fail, "x = 1").invalidated();
        assert_eq!(state.status(), RunStatus::Stale);
        assert_eq!(state.result().unwrap().outcome, RunOutcome::Fail);
        assert!(!state.regenerate_enabled());
    }

    #[test]
    fn mismatched_fingerprint_reads_as_stale() {
        let state = completed(RunOutcome::Pass, "x = 1");
        let current = Fingerprint::of("x = 2", "assert True");
        assert_eq!(state.clone().against(current).status(), RunStatus::Stale);

        let same = Fingerprint::of("x = 1", "assert True");
        assert_eq!(state.against(same).status(), RunStatus::Pass);
    }

    #[test]
    fn regenerate_follows_outcome() {
        assert!(!RunState::NotRun.regenerate_enabled());
        assert!(!completed(RunOutcome::Pass, "a").regenerate_enabled());
        assert!(completed(RunOutcome::Fail, "a").regenerate_enabled());
        assert!(completed(RunOutcome::Error, "a").regenerate_enabled());
    }

    #[test]
    fn status_tags_roundtrip() {
        for status in [
            RunStatus::None,
            RunStatus::Pass,
            RunStatus::Fail,
            RunStatus::Error,
            RunStatus::Stale,
        ] {
            assert_eq!(status.as_str().parse::<RunStatus>().unwrap(), status);
        }
        assert!("passed".parse::<RunStatus>().is_err());
        assert!("success".parse::<RunOutcome>().is_err());
    }

    #[test]
    fn serde_is_internally_tagged() {
        let json = serde_json::to_value(completed(RunOutcome::Fail, "a")).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["outcome"], "fail");
        let json = serde_json::to_value(RunState::NotRun).unwrap();
        assert_eq!(json["status"], "not_run");
    }

    #[derive(Debug, Clone)]
    enum Event {
        Run(RunOutcome),
        Edit,
    }

    fn event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Run(RunOutcome::Pass)),
            Just(Event::Run(RunOutcome::Fail)),
            Just(Event::Run(RunOutcome::Error)),
            Just(Event::Edit),
        ]
    }

    proptest! {
        #[test]
        fn prop_regenerate_tracks_last_event(events in prop::collection::vec(event(), 0..24)) {
            let mut state = RunState::NotRun;
            for event in &events {
                state = match event {
                    Event::Run(outcome) => completed(*outcome, "code"),
                    Event::Edit => state.invalidated(),
                };
            }

            let expected = matches!(
                events.last(),
                Some(Event::Run(RunOutcome::Fail)) | Some(Event::Run(RunOutcome::Error))
            );
            prop_assert_eq!(state.regenerate_enabled(), expected);
        }

        #[test]
        fn prop_no_run_means_not_run(edits in 0usize..10) {
            let mut state = RunState::NotRun;
            for _ in 0..edits {
                state = state.invalidated();
            }
            prop_assert_eq!(state, RunState::NotRun);
        }
    }
}

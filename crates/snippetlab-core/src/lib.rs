pub mod error;
pub mod fingerprint;
pub mod id;
pub mod language;
pub mod run;
pub mod snippet;
pub mod view;

// Re-export commonly used types
pub use error::CoreError;
pub use fingerprint::Fingerprint;
pub use id::SnippetId;
pub use language::Language;
pub use run::{RunOutcome, RunResult, RunState, RunStatus};
pub use snippet::{ExecutionState, Snippet};
pub use view::{RunView, SnippetView};

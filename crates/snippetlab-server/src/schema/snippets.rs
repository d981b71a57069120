//! Snippet request/response types.
//!
//! Snippets are rendered through [`SnippetView`], which carries the derived
//! affordances (`runnable`, `regenerate_enabled`, `execution_state`) computed
//! at read time, so clients never need to re-derive them.

use serde::{Deserialize, Serialize};

use snippetlab_core::RunOutcome;
use snippetlab_pipeline::{ExecutionReport, GenerationReport, SnippetUpdate, StepFailure};

pub use snippetlab_core::{RunView, SnippetView};

/// Request to generate code, title and language from a description.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub description: String,
}

/// Request to refine the code or the tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RefineRequest {
    /// `"code"` or `"tests"`.
    pub target: String,
    /// Free-form feedback, forwarded to the model untouched.
    pub feedback: String,
}

/// Manual edit of snippet fields. Absent or empty fields are left as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub test_code: Option<String>,
}

impl From<UpdateSnippetRequest> for SnippetUpdate {
    fn from(req: UpdateSnippetRequest) -> Self {
        SnippetUpdate {
            title: req.title,
            description: req.description,
            language: req.language,
            code: req.code,
            test_code: req.test_code,
        }
    }
}

/// Response for listing all snippets.
#[derive(Debug, Clone, Serialize)]
pub struct SnippetListResponse {
    /// All snippets in creation order.
    pub snippets: Vec<SnippetView>,
}

/// Response from initial generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub snippet: SnippetView,
    /// True when the code was saved but the title or language step failed.
    pub partial: bool,
    pub failures: Vec<StepFailure>,
}

impl From<GenerationReport> for GenerateResponse {
    fn from(report: GenerationReport) -> Self {
        GenerateResponse {
            partial: report.is_partial(),
            snippet: SnippetView::from(&report.snippet),
            failures: report.failures,
        }
    }
}

/// Response from a completed test run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub snippet: SnippetView,
    pub outcome: RunOutcome,
    pub message: String,
}

impl From<ExecutionReport> for RunResponse {
    fn from(report: ExecutionReport) -> Self {
        RunResponse {
            snippet: SnippetView::from(&report.snippet),
            outcome: report.outcome,
            message: report.message,
        }
    }
}

//! SnippetService: the coordinator between callers and the model, sandbox
//! and store.
//!
//! All business logic flows through [`SnippetService`]. Handlers and CLI
//! commands are thin wrappers that delegate to these methods.
//!
//! No store lock is held across a model or sandbox call. Every write is a
//! field-scoped [`SnippetPatch`], so concurrent sub-steps (title and language
//! detection) and overlapping operations on one snippet never overwrite each
//! other's fields. A run result that lands after its code changed is caught
//! by fingerprint when the snippet is read.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use snippetlab_core::{Language, RunOutcome, RunResult, RunState, Snippet, SnippetId};
use snippetlab_storage::{SnippetPatch, SnippetStore};

use crate::artifact;
use crate::config::PipelineConfig;
use crate::error::{GatewayError, PipelineError};
use crate::gateway::{GatewayRequest, LanguageModel, TaskKind};
use crate::sandbox::Sandbox;

/// Which artifact a refinement rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineTarget {
    Code,
    Tests,
}

impl FromStr for RefineTarget {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(RefineTarget::Code),
            "tests" | "test" => Ok(RefineTarget::Tests),
            other => Err(PipelineError::Validation(format!(
                "unknown refine target '{}': expected 'code' or 'tests'",
                other
            ))),
        }
    }
}

/// A manual edit of a snippet's fields. Absent or empty fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SnippetUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub test_code: Option<String>,
}

impl SnippetUpdate {
    fn into_patch(self) -> Result<SnippetPatch, PipelineError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let language = match present(self.language) {
            Some(tag) => Some(
                tag.parse::<Language>()
                    .map_err(|err| PipelineError::Validation(err.to_string()))?,
            ),
            None => None,
        };
        Ok(SnippetPatch {
            title: present(self.title),
            description: present(self.description),
            language,
            code: present(self.code),
            test_code: present(self.test_code),
            ..SnippetPatch::default()
        })
    }
}

/// A step of initial generation that failed after the code was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: TaskKind,
    pub message: String,
    pub retryable: bool,
}

/// Result of [`SnippetService::generate_initial`].
///
/// The code step either succeeds or fails the whole operation; title and
/// language failures are reported here next to the persisted snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub snippet: Snippet,
    pub failures: Vec<StepFailure>,
}

impl GenerationReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of [`SnippetService::run_tests`] for a run that completed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub snippet: Snippet,
    pub outcome: RunOutcome,
    pub message: String,
}

/// The pipeline coordinator. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct SnippetService {
    store: Arc<dyn SnippetStore>,
    model: Arc<dyn LanguageModel>,
    sandbox: Arc<dyn Sandbox>,
}

impl SnippetService {
    pub fn new(
        store: Arc<dyn SnippetStore>,
        model: Arc<dyn LanguageModel>,
        sandbox: Arc<dyn Sandbox>,
    ) -> Self {
        Self {
            store,
            model,
            sandbox,
        }
    }

    /// Builds the model and sandbox described by `config` around `store`.
    pub fn from_config(
        store: Arc<dyn SnippetStore>,
        config: &PipelineConfig,
    ) -> Result<Self, GatewayError> {
        Ok(Self::new(
            store,
            config.llm.build_model()?,
            config.sandbox.build_sandbox(),
        ))
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    pub fn create_empty(&self) -> Result<Snippet, PipelineError> {
        let snippet = self.store.create()?;
        tracing::info!("created snippet {}", snippet.id);
        Ok(snippet)
    }

    pub fn get(&self, id: SnippetId) -> Result<Snippet, PipelineError> {
        Ok(self.store.get(id)?)
    }

    /// All snippets in creation order.
    pub fn list(&self) -> Result<Vec<Snippet>, PipelineError> {
        Ok(self.store.list()?)
    }

    /// Applies a manual edit. Code or test edits invalidate the last run.
    pub fn update(&self, id: SnippetId, update: SnippetUpdate) -> Result<Snippet, PipelineError> {
        let patch = update.into_patch()?;
        let snippet = self.store.upsert_fields(id, &patch)?;
        tracing::info!("updated snippet {}", id);
        Ok(snippet)
    }

    pub fn delete(&self, id: SnippetId) -> Result<(), PipelineError> {
        self.store.delete(id)?;
        tracing::info!("deleted snippet {}", id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Generates code from `description`, then a title and a language.
    ///
    /// A code failure leaves the snippet untouched and fails the operation.
    /// Once code is saved, title generation and language detection run
    /// concurrently; each persists its own field when it succeeds, and
    /// failures are returned in the report rather than as an error.
    pub async fn generate_initial(
        &self,
        id: SnippetId,
        description: &str,
    ) -> Result<GenerationReport, PipelineError> {
        if description.trim().is_empty() {
            return Err(PipelineError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        self.store.get(id)?;

        let raw = self.complete(GatewayRequest::code(description)).await?;
        let code = artifact::clean_code(&raw).map_err(|source| PipelineError::Gateway {
            step: TaskKind::Code,
            source,
        })?;
        self.store.upsert_fields(
            id,
            &SnippetPatch::new().description(description).code(&code),
        )?;
        tracing::info!("generated code for snippet {}", id);

        let (title, language) = tokio::join!(
            self.title_step(id, description, &code),
            self.language_step(id, description, &code),
        );
        let failures: Vec<StepFailure> = [title?, language?].into_iter().flatten().collect();

        Ok(GenerationReport {
            snippet: self.store.get(id)?,
            failures,
        })
    }

    async fn title_step(
        &self,
        id: SnippetId,
        description: &str,
        code: &str,
    ) -> Result<Option<StepFailure>, PipelineError> {
        let outcome = self
            .model
            .generate(&GatewayRequest::title(description, code))
            .await
            .and_then(|raw| artifact::clean_title(&raw))
            .map(|title| SnippetPatch::new().title(title));
        self.apply_derived(id, TaskKind::Title, outcome)
    }

    async fn language_step(
        &self,
        id: SnippetId,
        description: &str,
        code: &str,
    ) -> Result<Option<StepFailure>, PipelineError> {
        let outcome = self
            .model
            .generate(&GatewayRequest::detect_language(description, code))
            .await
            .and_then(|raw| artifact::parse_language(&raw))
            .map(|language| SnippetPatch::new().language(language));
        self.apply_derived(id, TaskKind::DetectLanguage, outcome)
    }

    /// Persists a derived field, or turns a model failure into a report entry.
    fn apply_derived(
        &self,
        id: SnippetId,
        step: TaskKind,
        outcome: Result<SnippetPatch, GatewayError>,
    ) -> Result<Option<StepFailure>, PipelineError> {
        match outcome {
            Ok(patch) => {
                self.store.upsert_fields(id, &patch)?;
                Ok(None)
            }
            Err(err) => {
                tracing::warn!("{} step failed for snippet {}: {}", step, id, err);
                Ok(Some(StepFailure {
                    step,
                    retryable: err.is_retryable(),
                    message: err.to_string(),
                }))
            }
        }
    }

    /// Rewrites the code or the tests according to user feedback.
    ///
    /// The feedback is recorded next to the artifact it produced. The
    /// snippet's language is never changed.
    pub async fn refine(
        &self,
        id: SnippetId,
        target: RefineTarget,
        feedback: &str,
    ) -> Result<Snippet, PipelineError> {
        if feedback.trim().is_empty() {
            return Err(PipelineError::Validation(
                "feedback must not be empty".to_string(),
            ));
        }
        let snippet = self.store.get(id)?;

        let patch = match target {
            RefineTarget::Code => {
                if snippet.code.is_empty() {
                    return Err(PipelineError::Precondition(
                        "code must be generated before it can be refined".to_string(),
                    ));
                }
                let code = self
                    .complete_code(GatewayRequest::code_from_feedback(&snippet, feedback))
                    .await?;
                SnippetPatch::new().code(code).code_feedback(feedback)
            }
            RefineTarget::Tests => {
                if snippet.test_code.is_empty() {
                    return Err(PipelineError::Precondition(
                        "tests must be generated before they can be refined".to_string(),
                    ));
                }
                let tests = self
                    .complete_code(GatewayRequest::tests_from_feedback(&snippet, feedback))
                    .await?;
                SnippetPatch::new().test_code(tests).test_feedback(feedback)
            }
        };

        let snippet = self.store.upsert_fields(id, &patch)?;
        tracing::info!("refined {:?} of snippet {}", target, id);
        Ok(snippet)
    }

    /// Generates tests for the current code, replacing any existing tests.
    pub async fn generate_tests(&self, id: SnippetId) -> Result<Snippet, PipelineError> {
        let snippet = self.store.get(id)?;
        if snippet.code.is_empty() {
            return Err(PipelineError::Precondition(
                "code must be generated before tests".to_string(),
            ));
        }
        let tests = self.complete_code(GatewayRequest::tests(&snippet)).await?;
        let snippet = self
            .store
            .upsert_fields(id, &SnippetPatch::new().test_code(tests))?;
        tracing::info!("generated tests for snippet {}", id);
        Ok(snippet)
    }

    /// Repairs the code using the message of the current failed run.
    ///
    /// Only offered while the last run is current and did not pass.
    pub async fn regenerate(&self, id: SnippetId) -> Result<Snippet, PipelineError> {
        let snippet = self.store.get(id)?;
        let run = snippet.effective_run();
        let message = match (&run, run.regenerate_enabled()) {
            (RunState::Completed(result), true) => result.message.clone(),
            _ => {
                return Err(PipelineError::Precondition(format!(
                    "regeneration requires a current failed run (last run is '{}')",
                    run.status()
                )))
            }
        };

        let code = self
            .complete_code(GatewayRequest::regenerate(&snippet, &message))
            .await?;
        let snippet = self
            .store
            .upsert_fields(id, &SnippetPatch::new().code(code))?;
        tracing::info!("regenerated code for snippet {}", id);
        Ok(snippet)
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Runs the snippet's tests in the sandbox and records the result.
    ///
    /// The result is stamped with the fingerprint of the code and tests that
    /// were actually run. A sandbox failure is recorded as an `error`
    /// outcome and then returned as [`PipelineError::Execution`].
    pub async fn run_tests(&self, id: SnippetId) -> Result<ExecutionReport, PipelineError> {
        let snippet = self.store.get(id)?;
        let language = match snippet.language {
            Some(language) if language.is_executable() => language,
            other => return Err(PipelineError::UnsupportedLanguage { language: other }),
        };
        if snippet.code.is_empty() || snippet.test_code.is_empty() {
            return Err(PipelineError::Precondition(
                "code and tests are required to run".to_string(),
            ));
        }

        let fingerprint = snippet.fingerprint();
        tracing::info!("running tests for snippet {}", id);
        match self
            .sandbox
            .execute(language, &snippet.code, &snippet.test_code)
            .await
        {
            Ok(verdict) => {
                let result = RunResult {
                    outcome: verdict.outcome,
                    message: verdict.message.clone(),
                    fingerprint,
                };
                let snippet = self.store.upsert_fields(
                    id,
                    &SnippetPatch::new().last_run(RunState::Completed(result)),
                )?;
                tracing::info!("snippet {} tests: {}", id, verdict.outcome);
                Ok(ExecutionReport {
                    snippet,
                    outcome: verdict.outcome,
                    message: verdict.message,
                })
            }
            Err(err) => {
                tracing::warn!("sandbox failed for snippet {}: {}", id, err);
                let result = RunResult {
                    outcome: RunOutcome::Error,
                    message: err.to_string(),
                    fingerprint,
                };
                self.store.upsert_fields(
                    id,
                    &SnippetPatch::new().last_run(RunState::Completed(result)),
                )?;
                Err(PipelineError::Execution(err))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Model calls
    // -----------------------------------------------------------------------

    async fn complete(&self, request: GatewayRequest) -> Result<String, PipelineError> {
        tracing::debug!("requesting {}", request.kind);
        self.model
            .generate(&request)
            .await
            .map_err(|source| PipelineError::Gateway {
                step: request.kind,
                source,
            })
    }

    /// A model call whose answer must be a non-empty code artifact.
    async fn complete_code(&self, request: GatewayRequest) -> Result<String, PipelineError> {
        let step = request.kind;
        let raw = self.complete(request).await?;
        artifact::clean_code(&raw).map_err(|source| PipelineError::Gateway { step, source })
    }
}

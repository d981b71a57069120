//! The snippet generation, refinement and execution pipeline.
//!
//! [`SnippetService`] is the single coordinator between callers (HTTP
//! handlers, the CLI) and the three collaborators it sequences:
//!
//! - a [`LanguageModel`] that turns task payloads into text,
//! - a [`Sandbox`] that runs test code against source code,
//! - a [`SnippetStore`](snippetlab_storage::SnippetStore) that owns state.
//!
//! The service decides which action is valid for a snippet's current state,
//! what gets persisted, and how results flow into the next allowed action.

pub mod artifact;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod offline;
pub mod python;
pub mod sandbox;
pub mod service;

pub use config::{LlmConfig, PipelineConfig, Provider, SandboxConfig};
pub use error::{GatewayError, PipelineError, SandboxError};
pub use gateway::{GatewayRequest, LanguageModel, TaskKind};
pub use sandbox::{Sandbox, SandboxVerdict};
pub use service::{
    ExecutionReport, GenerationReport, RefineTarget, SnippetService, SnippetUpdate, StepFailure,
};

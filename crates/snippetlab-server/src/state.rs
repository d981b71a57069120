//! Application state shared by all handlers.
//!
//! [`SnippetService`] synchronizes through its store, so handlers share it
//! behind a plain `Arc` and never hold a lock across a model or sandbox call.

use std::sync::Arc;

use snippetlab_pipeline::offline::OfflineModel;
use snippetlab_pipeline::{SandboxConfig, SnippetService};
use snippetlab_storage::{InMemoryStore, SqliteStore};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SnippetService>,
}

impl AppState {
    /// Creates state backed by the SQLite database and collaborators named
    /// in `config`.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let store = SqliteStore::new(&config.db_path)
            .map_err(|e| ApiError::InternalError(format!("failed to open store: {}", e)))?;
        let service = SnippetService::from_config(Arc::new(store), &config.pipeline)
            .map_err(|e| ApiError::InternalError(format!("failed to build model: {}", e)))?;
        Ok(Self::from_service(service))
    }

    /// Creates state with an in-memory store and the offline model (for
    /// testing and demos).
    pub fn in_memory() -> Self {
        let service = SnippetService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(OfflineModel),
            SandboxConfig::default().build_sandbox(),
        );
        Self::from_service(service)
    }

    pub fn from_service(service: SnippetService) -> Self {
        AppState {
            service: Arc::new(service),
        }
    }
}

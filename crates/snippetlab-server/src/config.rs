//! Server configuration from environment variables.
//!
//! - `SNIPPETLAB_DB_PATH`: SQLite database file path (default: "snippetlab.db")
//! - `SNIPPETLAB_PORT`: server listen port (default: 3000)
//! - `SNIPPETLAB_LLM_*`, `SNIPPETLAB_PYTHON`, `SNIPPETLAB_RUN_TIMEOUT_MS`:
//!   see [`PipelineConfig::from_env`]

use snippetlab_pipeline::{GatewayError, PipelineConfig};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub port: u16,
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        let db_path =
            std::env::var("SNIPPETLAB_DB_PATH").unwrap_or_else(|_| "snippetlab.db".to_string());
        let port = std::env::var("SNIPPETLAB_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(3000);

        Ok(ServerConfig {
            db_path,
            port,
            pipeline: PipelineConfig::from_env()?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

//! Binary entrypoint for the snippetlab HTTP server.
//!
//! Configuration comes from environment variables; see
//! [`snippetlab_server::config`].

use snippetlab_server::config::ServerConfig;
use snippetlab_server::router::build_router;
use snippetlab_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("Invalid configuration");
    let state = AppState::new(&config).expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!(
        "snippetlab server starting on {} (model provider: {})",
        addr,
        config.pipeline.llm.provider.as_str()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

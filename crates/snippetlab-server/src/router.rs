//! Router assembly for the snippet HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax.
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Records
        .route(
            "/snippets",
            get(handlers::snippets::list_snippets).post(handlers::snippets::create_snippet),
        )
        .route(
            "/snippets/{id}",
            get(handlers::snippets::get_snippet)
                .put(handlers::snippets::update_snippet)
                .delete(handlers::snippets::delete_snippet),
        )
        // Pipeline
        .route("/snippets/{id}/generate", post(handlers::snippets::generate))
        .route("/snippets/{id}/refine", post(handlers::snippets::refine))
        .route("/snippets/{id}/tests", post(handlers::snippets::generate_tests))
        .route(
            "/snippets/{id}/regenerate",
            post(handlers::snippets::regenerate),
        )
        .route("/snippets/{id}/run", post(handlers::snippets::run_tests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

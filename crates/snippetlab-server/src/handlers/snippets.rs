//! Snippet handlers: records, generation, refinement and test runs.

use axum::extract::{Path, State};
use axum::Json;

use snippetlab_core::SnippetId;
use snippetlab_pipeline::RefineTarget;

use crate::error::ApiError;
use crate::schema::snippets::{
    GenerateRequest, GenerateResponse, RefineRequest, RunResponse, SnippetListResponse,
    SnippetView, UpdateSnippetRequest,
};
use crate::state::AppState;

/// Lists all snippets.
///
/// `GET /snippets`
pub async fn list_snippets(
    State(state): State<AppState>,
) -> Result<Json<SnippetListResponse>, ApiError> {
    let snippets = state.service.list()?;
    Ok(Json(SnippetListResponse {
        snippets: snippets.iter().map(SnippetView::from).collect(),
    }))
}

/// Creates an empty snippet.
///
/// `POST /snippets`
pub async fn create_snippet(
    State(state): State<AppState>,
) -> Result<Json<SnippetView>, ApiError> {
    let snippet = state.service.create_empty()?;
    Ok(Json(snippet.into()))
}

/// `GET /snippets/{id}`
pub async fn get_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SnippetView>, ApiError> {
    let snippet = state.service.get(SnippetId(id))?;
    Ok(Json(snippet.into()))
}

/// Manually edits snippet fields.
///
/// `PUT /snippets/{id}`
pub async fn update_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSnippetRequest>,
) -> Result<Json<SnippetView>, ApiError> {
    let snippet = state.service.update(SnippetId(id), req.into())?;
    Ok(Json(snippet.into()))
}

/// `DELETE /snippets/{id}`
pub async fn delete_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.delete(SnippetId(id))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Generates code, then title and language, from a description.
///
/// `POST /snippets/{id}/generate`
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let report = state
        .service
        .generate_initial(SnippetId(id), &req.description)
        .await?;
    Ok(Json(report.into()))
}

/// Rewrites the code or tests according to feedback.
///
/// `POST /snippets/{id}/refine`
pub async fn refine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RefineRequest>,
) -> Result<Json<SnippetView>, ApiError> {
    let target: RefineTarget = req.target.parse()?;
    let snippet = state
        .service
        .refine(SnippetId(id), target, &req.feedback)
        .await?;
    Ok(Json(snippet.into()))
}

/// Generates tests for the current code.
///
/// `POST /snippets/{id}/tests`
pub async fn generate_tests(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SnippetView>, ApiError> {
    let snippet = state.service.generate_tests(SnippetId(id)).await?;
    Ok(Json(snippet.into()))
}

/// Repairs the code after a failed run.
///
/// `POST /snippets/{id}/regenerate`
pub async fn regenerate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SnippetView>, ApiError> {
    let snippet = state.service.regenerate(SnippetId(id)).await?;
    Ok(Json(snippet.into()))
}

/// Runs the snippet's tests.
///
/// `POST /snippets/{id}/run`
pub async fn run_tests(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RunResponse>, ApiError> {
    let report = state.service.run_tests(SnippetId(id)).await?;
    Ok(Json(report.into()))
}

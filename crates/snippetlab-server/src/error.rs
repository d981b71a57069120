//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use snippetlab_pipeline::PipelineError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "GATEWAY_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (e.g., the retryable flag).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request input (422).
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The snippet is not in a state that allows the operation (409).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The snippet's language cannot be executed (409).
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The language model failed (502).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        step: String,
        retryable: bool,
    },

    /// The sandbox failed (502).
    #[error("execution error: {message}")]
    Execution { message: String, retryable: bool },

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::ValidationFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED", None)
            }
            ApiError::PreconditionFailed(_) => {
                (StatusCode::CONFLICT, "PRECONDITION_FAILED", None)
            }
            ApiError::UnsupportedLanguage(_) => {
                (StatusCode::CONFLICT, "UNSUPPORTED_LANGUAGE", None)
            }
            ApiError::Gateway {
                step, retryable, ..
            } => (
                StatusCode::BAD_GATEWAY,
                "GATEWAY_ERROR",
                Some(serde_json::json!({ "step": step, "retryable": retryable })),
            ),
            ApiError::Execution { retryable, .. } => (
                StatusCode::BAD_GATEWAY,
                "EXECUTION_ERROR",
                Some(serde_json::json!({ "retryable": retryable })),
            ),
            ApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        };

        let detail = ApiErrorDetail {
            code: code.to_string(),
            message: self.to_string(),
            details,
        };
        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let retryable = err.is_retryable();
        match err {
            PipelineError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PipelineError::Validation(msg) => ApiError::ValidationFailed(msg),
            PipelineError::Precondition(msg) => ApiError::PreconditionFailed(msg),
            PipelineError::UnsupportedLanguage { .. } => {
                ApiError::UnsupportedLanguage(err.to_string())
            }
            PipelineError::Gateway { step, ref source } => ApiError::Gateway {
                message: source.to_string(),
                step: step.to_string(),
                retryable,
            },
            PipelineError::Execution(ref source) => ApiError::Execution {
                message: source.to_string(),
                retryable,
            },
            PipelineError::Storage(ref source) => {
                tracing::error!("storage failure: {}", source);
                ApiError::InternalError(source.to_string())
            }
        }
    }
}

//! API error types with structured JSON responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Seconds a client should wait before retrying after an outage.
pub const RETRY_AFTER_SECS: u64 = 5;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Pipeline(err) => pipeline_status(err),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                internal()
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::Pipeline(PipelineError::SourceUnavailable { .. }) = &self {
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

fn pipeline_status(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
        }
        PipelineError::BatchSizeExceeded { .. } => {
            (StatusCode::BAD_REQUEST, "BATCH_SIZE_EXCEEDED", err.to_string())
        }
        PipelineError::InsufficientInput { .. } => {
            (StatusCode::BAD_REQUEST, "INSUFFICIENT_INPUT", err.to_string())
        }
        PipelineError::SourceUnavailable { service, detail } => {
            tracing::warn!(%service, detail, "Upstream service unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SOURCE_UNAVAILABLE",
                format!("{service} is unavailable, retry in {RETRY_AFTER_SECS}s"),
            )
        }
        PipelineError::ClassificationContractViolation(detail) => {
            tracing::warn!(detail, "Classification rejected");
            (
                StatusCode::BAD_GATEWAY,
                "CLASSIFICATION_FAILED",
                "The reasoning engine returned an unusable answer".to_string(),
            )
        }
        PipelineError::InvariantViolation(detail) => {
            tracing::error!(detail, "Interaction report invariant violated");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL",
        "An internal error occurred".to_string(),
    )
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("pipeline task failed: {err}"))
    }
}

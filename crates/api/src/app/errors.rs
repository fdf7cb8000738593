use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use commissary_core::DomainError;
use commissary_infra::PipelineError;

pub type ApiResult = Result<Response, Response>;

pub fn pipeline_error_to_response(err: PipelineError) -> Response {
    match err {
        PipelineError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
        e @ PipelineError::PermissionDenied { .. } => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", e.to_string())
        }
        PipelineError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        PipelineError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        PipelineError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        e @ PipelineError::AllocationExhausted { .. } => {
            error!(error = %e, "barcode allocation exhausted");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "allocation_exhausted", e.to_string())
        }
        PipelineError::StorageUnavailable(msg) => {
            error!(error = %msg, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_unavailable",
                "the request could not be completed; no changes were made",
            )
        }
    }
}

/// Input rejected before it reaches the pipeline.
pub fn domain_error_to_response(err: DomainError) -> Response {
    pipeline_error_to_response(PipelineError::from(err))
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

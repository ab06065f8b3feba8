//! Maps domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use classroom_core::ClassroomError;
use classroom_storage::StorageError;
use serde_json::json;

/// A REST-facing error: a status code plus the domain error that produced
/// it. Every handler returns `Result<_, ApiError>` and lets axum render the
/// body via [`IntoResponse`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A request failed field-format or permission validation.
    #[error(transparent)]
    Domain(#[from] ClassroomError),

    /// The requested session does not exist.
    #[error("session not found")]
    SessionNotFound,

    /// The session has already ended.
    #[error("session already ended")]
    SessionAlreadyEnded,

    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::Domain(err) => (status_for_kind(err.kind()), err.kind()),
            ApiError::SessionNotFound => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::SessionAlreadyEnded => (StatusCode::BAD_REQUEST, "state"),
            ApiError::Storage(StorageError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "persistence"),
        };
        let body = json!({ "error": kind, "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

fn status_for_kind(kind: &str) -> StatusCode {
    match kind {
        "validation" => StatusCode::BAD_REQUEST,
        "authorization" => StatusCode::FORBIDDEN,
        "state" => StatusCode::CONFLICT,
        "resource" => StatusCode::TOO_MANY_REQUESTS,
        "persistence" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

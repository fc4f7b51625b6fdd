//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use haven_types::error::{RepositoryError, VideoError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Video provider errors.
    Video(VideoError),
    /// Relational persistence errors.
    Repository(RepositoryError),
    /// Generic internal error.
    Internal(String),
}

impl From<VideoError> for AppError {
    fn from(e: VideoError) -> Self {
        AppError::Video(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Video(VideoError::NotFound) => (
                StatusCode::NOT_FOUND,
                "VIDEO_SESSION_NOT_FOUND",
                "No active video session for this channel".to_string(),
            ),
            AppError::Video(e) => (StatusCode::BAD_GATEWAY, "VIDEO_PROVIDER_ERROR", e.to_string()),
            AppError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Entity not found".to_string())
            }
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR", e.to_string())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

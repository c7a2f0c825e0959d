//! API error types and JSON responses

use crate::storage::StorageError;
use crate::upload::UploadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API clients as `{"error": message}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing multipart boundary in Content-Type")]
    MissingBoundary,

    #[error("No file provided")]
    NoFileProvided,

    #[error("Invalid upload role: {0}")]
    InvalidRole(String),

    #[error("Content type {content_type} is not allowed for role {role}")]
    UnsupportedContentType { role: String, content_type: String },

    #[error("Missing url")]
    MissingUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingBoundary
            | ApiError::NoFileProvided
            | ApiError::InvalidRole(_)
            | ApiError::UnsupportedContentType { .. }
            | ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageWriteFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NoFileProvided => ApiError::NoFileProvided,
            UploadError::InvalidRole(role) => ApiError::InvalidRole(role),
            UploadError::UnsupportedContentType { role, content_type } => {
                ApiError::UnsupportedContentType {
                    role: role.to_string(),
                    content_type,
                }
            }
            UploadError::Storage(e) => ApiError::StorageWriteFailed(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ApiError::NotFound(key),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

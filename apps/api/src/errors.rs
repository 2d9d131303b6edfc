use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The artifact variants keep "does not exist" (`NotFound`), "rejected input"
/// (`Validation`, `UnsupportedType`) and "server storage failure"
/// (`StorageWrite`, `ArtifactMissing`) distinguishable for clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// A metadata record exists but its backing file does not. This is an
    /// integrity violation (filesystem/database drift), not a client 404.
    #[error("Artifact file missing: {0}")]
    ArtifactMissing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_TYPE",
                msg.clone(),
            ),
            AppError::StorageWrite(msg) => {
                tracing::error!("Storage write error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_WRITE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::ArtifactMissing(msg) => {
                tracing::error!("Artifact integrity violation: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ARTIFACT_MISSING",
                    "The stored file for this record is missing".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::artifact::ArtifactRow;
use crate::state::AppState;

/// Wire shape of a resume descriptor. `file_url` is the host-relative
/// download path; clients resolve it against the API base URL.
#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub id: i64,
    pub original_filename: String,
    pub mime_type: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<ArtifactRow> for ResumeResponse {
    fn from(row: ArtifactRow) -> Self {
        Self {
            file_url: format!("/resume/{}/file", row.id),
            id: row.id,
            original_filename: row.original_name,
            mime_type: row.content_type,
            created_at: row.created_at,
        }
    }
}

/// POST /resume/
/// Multipart upload; the document goes in a field named `file`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .ok_or_else(|| AppError::Validation("file field is missing a filename".to_string()))?
            .to_string();
        let content_type = field.content_type().map(str::to_string);

        let data = field
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .boxed();
        let record = state
            .artifacts
            .upload(&original_name, content_type.as_deref(), data)
            .await?;
        return Ok((StatusCode::CREATED, Json(record.into())));
    }

    Err(AppError::Validation(
        "multipart field 'file' is required".to_string(),
    ))
}

/// GET /resume/latest
/// The most recently uploaded resume, or JSON `null` if none exists.
pub async fn handle_latest(
    State(state): State<AppState>,
) -> Result<Json<Option<ResumeResponse>>, AppError> {
    let latest = state.artifacts.get_latest().await?;
    Ok(Json(latest.map(ResumeResponse::from)))
}

/// GET /resume/:id/file
/// Streams the stored document with its original filename for download.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (record, stream) = state.artifacts.stream(id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        record.original_name.replace(['"', '\r', '\n'], "_")
    );
    let headers = [
        (header::CONTENT_TYPE, record.content_type.clone()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// DELETE /resume/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.artifacts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

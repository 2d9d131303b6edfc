use std::io;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::stream::BoxStream;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::artifacts::store::{ArtifactStore, ByteStream, RemoveOutcome, StoreError};
use crate::errors::AppError;
use crate::models::artifact::ArtifactRow;

/// The only file extension accepted for upload, matched case-insensitively.
const ACCEPTED_EXTENSION: &str = ".pdf";

/// Declared MIME type recorded when the client supplies none.
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// Sequences store operations with metadata persistence so file and record
/// stay consistent under partial failure.
///
/// The one ordering rule: within an upload, the file must exist before the
/// record does. A reader can therefore never observe a record whose file was
/// never written. The converse (a file without a record) is tolerated as an
/// orphan and is not reconciled.
pub struct ArtifactRegistry {
    pool: SqlitePool,
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactRegistry {
    pub fn new(pool: SqlitePool, store: Arc<dyn ArtifactStore>) -> Self {
        Self { pool, store }
    }

    /// Validates, writes the file, then persists the metadata record.
    ///
    /// A failed write aborts the upload with no record. A failed insert after
    /// a successful write leaves the file behind as an orphan; it is logged
    /// and left in place rather than blocking the error response on cleanup.
    pub async fn upload(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: BoxStream<'_, io::Result<Bytes>>,
    ) -> Result<ArtifactRow, AppError> {
        let original_name = original_name.trim();
        if original_name.is_empty() {
            return Err(AppError::Validation("a filename is required".to_string()));
        }
        if !original_name.to_lowercase().ends_with(ACCEPTED_EXTENSION) {
            return Err(AppError::UnsupportedType(format!(
                "only {ACCEPTED_EXTENSION} files are allowed"
            )));
        }

        let storage_path = self.store.reserve_name(original_name).map_err(|e| match e {
            StoreError::InvalidInput(msg) => AppError::Validation(msg),
            other => AppError::Internal(anyhow::Error::new(other)),
        })?;

        self.store
            .write(&storage_path, data)
            .await
            .map_err(|e| AppError::StorageWrite(e.to_string()))?;

        let content_type = match content_type {
            Some(ct) if !ct.trim().is_empty() => ct.to_string(),
            _ => DEFAULT_CONTENT_TYPE.to_string(),
        };

        let record: ArtifactRow = sqlx::query_as(
            r#"
            INSERT INTO resumes (storage_path, original_name, content_type, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&storage_path)
        .bind(original_name)
        .bind(&content_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(
                path = %storage_path,
                "metadata insert failed after file write; file left behind as an orphan: {e}"
            );
            AppError::Database(e)
        })?;

        info!(id = record.id, original_name, "stored resume artifact");
        Ok(record)
    }

    /// The record with the maximum id, or `None` on an empty registry.
    pub async fn get_latest(&self) -> Result<Option<ArtifactRow>, AppError> {
        Ok(
            sqlx::query_as("SELECT * FROM resumes ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get(&self, id: i64) -> Result<ArtifactRow, AppError> {
        sqlx::query_as("SELECT * FROM resumes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
    }

    /// Looks up the record and opens its file for streaming.
    ///
    /// A live record whose file is gone is filesystem/database drift and is
    /// surfaced as [`AppError::ArtifactMissing`], never folded into a 404.
    pub async fn stream(&self, id: i64) -> Result<(ArtifactRow, ByteStream), AppError> {
        let record = self.get(id).await?;
        let stream = self
            .store
            .read(&record.storage_path)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(path) => {
                    error!(
                        id = record.id,
                        path = %path,
                        "resume record exists but its backing file is missing"
                    );
                    AppError::ArtifactMissing(format!("resume {id} has no file at {path}"))
                }
                other => AppError::Internal(anyhow::Error::new(other)),
            })?;
        Ok((record, stream))
    }

    /// Removes the file (best-effort), then deletes the record.
    ///
    /// The record is the existence signal for clients, so it is deleted even
    /// when file removal fails; the failure is logged, never propagated.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let record = self.get(id).await?;

        match self.store.remove(&record.storage_path).await {
            RemoveOutcome::Removed => {}
            RemoveOutcome::AlreadyAbsent => {
                warn!(id, path = %record.storage_path, "resume file was already absent at delete");
            }
            RemoveOutcome::Failed(e) => {
                warn!(
                    id,
                    path = %record.storage_path,
                    "failed to remove resume file, deleting record anyway: {e}"
                );
            }
        }

        sqlx::query("DELETE FROM resumes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id, "deleted resume artifact");
        Ok(())
    }
}

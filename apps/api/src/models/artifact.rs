use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row per uploaded resume. Rows are never mutated after creation; the
/// lifecycle is insert on upload, delete on removal.
///
/// `storage_path` is owned by the artifact store's naming policy and is never
/// derived from user input. `original_name` is display-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtifactRow {
    pub id: i64,
    pub storage_path: String,
    pub original_name: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

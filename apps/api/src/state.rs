use std::sync::Arc;

use sqlx::SqlitePool;

use crate::artifacts::registry::ArtifactRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub artifacts: Arc<ArtifactRegistry>,
}

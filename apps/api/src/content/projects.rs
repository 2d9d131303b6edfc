use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json as SqlJson;

use crate::errors::AppError;
use crate::models::content::ProjectRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default = "default_featured")]
    pub featured: String,
    #[serde(default)]
    pub order_index: i64,
}

fn default_featured() -> String {
    "false".to_string()
}

/// Absent fields keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<String>,
    pub order_index: Option<i64>,
}

/// GET /projects/
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    let rows =
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects ORDER BY order_index ASC, id ASC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

/// POST /projects/
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProject>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    let now = Utc::now();
    let row: ProjectRow = sqlx::query_as(
        r#"
        INSERT INTO projects
            (title, description, image, tags, live_url, github_url, featured, order_index, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING *
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.image)
    .bind(req.tags.map(SqlJson))
    .bind(&req.live_url)
    .bind(&req.github_url)
    .bind(&req.featured)
    .bind(req.order_index)
    .bind(now)
    .bind(now)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<ProjectRow>, AppError> {
    let row: Option<ProjectRow> = sqlx::query_as(
        r#"
        UPDATE projects SET
            title       = COALESCE(?1, title),
            description = COALESCE(?2, description),
            image       = COALESCE(?3, image),
            tags        = COALESCE(?4, tags),
            live_url    = COALESCE(?5, live_url),
            github_url  = COALESCE(?6, github_url),
            featured    = COALESCE(?7, featured),
            order_index = COALESCE(?8, order_index),
            updated_at  = ?9
        WHERE id = ?10
        RETURNING *
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.image)
    .bind(req.tags.map(SqlJson))
    .bind(&req.live_url)
    .bind(&req.github_url)
    .bind(&req.featured)
    .bind(req.order_index)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
}

/// DELETE /projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::registry::ArtifactRegistry;
    use crate::artifacts::store::DiskStore;
    use crate::db::{create_pool, init_schema};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn test_state(dir: &TempDir) -> AppState {
        let db_path = dir.path().join("test.db");
        let pool = create_pool(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        let store = Arc::new(DiskStore::new(dir.path().join("uploads")));
        AppState {
            artifacts: Arc::new(ArtifactRegistry::new(pool.clone(), store)),
            db: pool,
        }
    }

    fn project(title: &str, order_index: i64) -> CreateProject {
        CreateProject {
            title: title.to_string(),
            description: "desc".to_string(),
            image: None,
            tags: Some(vec!["Rust".to_string()]),
            live_url: None,
            github_url: None,
            featured: "true".to_string(),
            order_index,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_order_index_then_id() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        create_project(State(state.clone()), Json(project("second", 1)))
            .await
            .unwrap();
        create_project(State(state.clone()), Json(project("first", 0)))
            .await
            .unwrap();

        let Json(rows) = list_projects(State(state)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "first");
        assert_eq!(rows[1].title, "second");
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (_, Json(created)) = create_project(State(state.clone()), Json(project("old", 0)))
            .await
            .unwrap();

        let Json(updated) = update_project(
            State(state),
            Path(created.id),
            Json(UpdateProject {
                title: Some("new".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, "desc", "untouched fields must survive");
        assert_eq!(updated.featured, "true");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_project_404() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let err = update_project(State(state.clone()), Path(99), Json(UpdateProject::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = delete_project(State(state), Path(99)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_project() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (_, Json(created)) = create_project(State(state.clone()), Json(project("p", 0)))
            .await
            .unwrap();
        let status = delete_project(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(rows) = list_projects(State(state)).await.unwrap();
        assert!(rows.is_empty());
    }
}

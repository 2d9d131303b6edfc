use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::content::{SkillCategoryRow, SkillRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSkill {
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillCategory {
    pub name: String,
    #[serde(default)]
    pub order_index: i64,
}

/// A category with its skills nested, as the front-end consumes them.
#[derive(Debug, Serialize)]
pub struct SkillCategoryResponse {
    pub id: i64,
    pub name: String,
    pub order_index: i64,
    pub skills: Vec<SkillRow>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /skills/
pub async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<SkillRow>>, AppError> {
    let rows =
        sqlx::query_as::<_, SkillRow>("SELECT * FROM skills ORDER BY order_index ASC, id ASC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

/// POST /skills/
pub async fn create_skill(
    State(state): State<AppState>,
    Json(req): Json<CreateSkill>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    let category_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM skill_categories WHERE id = ?1)")
            .bind(req.category_id)
            .fetch_one(&state.db)
            .await?;
    if !category_exists {
        return Err(AppError::Validation(format!(
            "skill category {} does not exist",
            req.category_id
        )));
    }

    let now = Utc::now();
    let row: SkillRow = sqlx::query_as(
        r#"
        INSERT INTO skills (name, category_id, order_index, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(req.category_id)
    .bind(req.order_index)
    .bind(now)
    .bind(now)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /skills/:id
pub async fn delete_skill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM skills WHERE id = ?1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Skill {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /skills/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillCategoryResponse>>, AppError> {
    let categories = sqlx::query_as::<_, SkillCategoryRow>(
        "SELECT * FROM skill_categories ORDER BY order_index ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await?;
    let skills =
        sqlx::query_as::<_, SkillRow>("SELECT * FROM skills ORDER BY order_index ASC, id ASC")
            .fetch_all(&state.db)
            .await?;

    let grouped = categories
        .into_iter()
        .map(|category| SkillCategoryResponse {
            skills: skills
                .iter()
                .filter(|s| s.category_id == category.id)
                .cloned()
                .collect(),
            id: category.id,
            name: category.name,
            order_index: category.order_index,
            created_at: category.created_at,
            updated_at: category.updated_at,
        })
        .collect();
    Ok(Json(grouped))
}

/// POST /skills/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateSkillCategory>,
) -> Result<(StatusCode, Json<SkillCategoryRow>), AppError> {
    let now = Utc::now();
    let row: SkillCategoryRow = sqlx::query_as(
        r#"
        INSERT INTO skill_categories (name, order_index, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(req.order_index)
    .bind(now)
    .bind(now)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /skills/categories/:id
/// Deleting a category cascades to its skills.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM skill_categories WHERE id = ?1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Skill category {id} not found")));
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

    #[tokio::test]
    async fn test_categories_nest_their_skills() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (_, Json(backend)) = create_category(
            State(state.clone()),
            Json(CreateSkillCategory {
                name: "Backend".to_string(),
                order_index: 0,
            }),
        )
        .await
        .unwrap();
        let (_, Json(frontend)) = create_category(
            State(state.clone()),
            Json(CreateSkillCategory {
                name: "Frontend".to_string(),
                order_index: 1,
            }),
        )
        .await
        .unwrap();

        create_skill(
            State(state.clone()),
            Json(CreateSkill {
                name: "Axum".to_string(),
                category_id: backend.id,
                order_index: 0,
            }),
        )
        .await
        .unwrap();

        let Json(categories) = list_categories(State(state)).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Backend");
        assert_eq!(categories[0].skills.len(), 1);
        assert_eq!(categories[0].skills[0].name, "Axum");
        assert_eq!(
            categories[1].id, frontend.id,
            "empty categories still appear"
        );
        assert!(categories[1].skills.is_empty());
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_skills() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (_, Json(category)) = create_category(
            State(state.clone()),
            Json(CreateSkillCategory {
                name: "Backend".to_string(),
                order_index: 0,
            }),
        )
        .await
        .unwrap();
        create_skill(
            State(state.clone()),
            Json(CreateSkill {
                name: "Axum".to_string(),
                category_id: category.id,
                order_index: 0,
            }),
        )
        .await
        .unwrap();

        delete_category(State(state.clone()), Path(category.id))
            .await
            .unwrap();

        let Json(skills) = list_skills(State(state)).await.unwrap();
        assert!(skills.is_empty(), "cascade must remove the category's skills");
    }

    #[tokio::test]
    async fn test_create_skill_requires_existing_category() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let err = create_skill(
            State(state),
            Json(CreateSkill {
                name: "Axum".to_string(),
                category_id: 999,
                order_index: 0,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

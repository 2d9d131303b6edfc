use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json as SqlJson;

use crate::errors::AppError;
use crate::models::content::ExperienceRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateExperience {
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub order_index: i64,
}

/// GET /experiences/
pub async fn list_experiences(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExperienceRow>>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences ORDER BY order_index ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// POST /experiences/
pub async fn create_experience(
    State(state): State<AppState>,
    Json(req): Json<CreateExperience>,
) -> Result<(StatusCode, Json<ExperienceRow>), AppError> {
    let now = Utc::now();
    let row: ExperienceRow = sqlx::query_as(
        r#"
        INSERT INTO experiences
            (role, company, period, start_date, end_date, description, tags, order_index, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING *
        "#,
    )
    .bind(&req.role)
    .bind(&req.company)
    .bind(&req.period)
    .bind(&req.start_date)
    .bind(&req.end_date)
    .bind(&req.description)
    .bind(req.tags.map(SqlJson))
    .bind(req.order_index)
    .bind(now)
    .bind(now)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /experiences/:id
pub async fn delete_experience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM experiences WHERE id = ?1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Experience {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::content::ContactRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// GET /contacts/
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactRow>>, AppError> {
    let rows = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts ORDER BY id DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// POST /contacts/
pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContact>,
) -> Result<(StatusCode, Json<ContactRow>), AppError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::Validation(
            "name, email and message are all required".to_string(),
        ));
    }

    let now = Utc::now();
    let row: ContactRow = sqlx::query_as(
        r#"
        INSERT INTO contacts (name, email, message, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, 'unread', ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(&req.message)
    .bind(now)
    .bind(now)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /contacts/:id
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Contact {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

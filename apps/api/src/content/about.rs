use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::content::{AboutSectionRow, StatRow};
use crate::state::AppState;

/// GET /about/content
pub async fn list_content(
    State(state): State<AppState>,
) -> Result<Json<Vec<AboutSectionRow>>, AppError> {
    let rows = sqlx::query_as::<_, AboutSectionRow>(
        "SELECT * FROM about_sections ORDER BY order_index ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /about/stats
pub async fn list_stats(State(state): State<AppState>) -> Result<Json<Vec<StatRow>>, AppError> {
    let rows =
        sqlx::query_as::<_, StatRow>("SELECT * FROM stats ORDER BY order_index ASC, id ASC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

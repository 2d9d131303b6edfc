use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::content::SocialLinkRow;
use crate::state::AppState;

/// GET /social-links/
pub async fn list_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialLinkRow>>, AppError> {
    let rows = sqlx::query_as::<_, SocialLinkRow>(
        "SELECT * FROM social_links ORDER BY order_index ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

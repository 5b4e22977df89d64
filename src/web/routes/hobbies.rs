use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::database::hobby_repo::{self, HobbyRow};
use crate::web::state::AppState;

// Hobby catalogue for the registration/profile dropdowns.
pub async fn list_hobbies_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<HobbyRow>>, (StatusCode, Json<Value>)> {
    match hobby_repo::list_hobbies(&state.pool).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            warn!("Hobby list load failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error." })),
            ))
        }
    }
}

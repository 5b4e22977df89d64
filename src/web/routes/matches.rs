use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::MatchError;
use crate::models::MatchResult;
use crate::services::embedding_service::{self, RefreshOutcome};
use crate::services::match_service::{self, MatchOptions, DEFAULT_TOP_N};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    top_n: Option<i64>,
    role: Option<String>,
    // Kept as raw text so a malformed value gets our own 400 message.
    distance_km: Option<String>,
}

pub async fn match_handler(
    Path(user_id): Path<i64>,
    Query(query): Query<MatchQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchResult>>, (StatusCode, Json<Value>)> {
    let distance_km = match query
        .distance_km
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Some(v),
            _ => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "distance_km must be a positive number" })),
                ))
            }
        },
        None => None,
    };

    let options = MatchOptions {
        top_n: query.top_n.unwrap_or(DEFAULT_TOP_N as i64).max(1) as usize,
        target_role: query
            .role
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        distance_km,
    };

    match match_service::find_matches(&state.pool, &state.embedder, &state.geocoder, user_id, &options)
        .await
    {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            warn!("Match lookup failed for user {}: {}", user_id, e);
            Err(match_error_response(e))
        }
    }
}

pub async fn match_refresh_handler(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match embedding_service::refresh_user_embedding(&state.pool, &state.embedder, user_id).await {
        Ok(RefreshOutcome::Refreshed { model, dimension }) => Ok(Json(json!({
            "refreshed": true,
            "model": model,
            "dimension": dimension,
        }))),
        Ok(RefreshOutcome::NoHobbies) => Ok(Json(json!({
            "refreshed": false,
            "reason": "no_hobbies",
        }))),
        Err(e) => {
            warn!("Embedding refresh failed for user {}: {}", user_id, e);
            Err(match_error_response(e))
        }
    }
}

fn match_error_response(err: MatchError) -> (StatusCode, Json<Value>) {
    match err {
        MatchError::UserNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found." })),
        ),
        MatchError::Embedding(_) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Embedding backend unavailable." })),
        ),
        MatchError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error." })),
        ),
    }
}

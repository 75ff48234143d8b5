use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictQuery {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub exclude_event_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub conflict: Option<String>,
}

/// POST /conflicts - Dry-run of the double-booking check for form pre-validation
async fn check_conflict(
    State(state): State<AppState>,
    Json(query): Json<ConflictQuery>,
) -> Result<Json<ConflictResponse>, ApiError> {
    let conflict = state.with_bookings(|bookings| {
        Ok(bookings.check_conflict(
            &query.date,
            query.participants.as_slice(),
            query.exclude_event_id.as_deref(),
        )?)
    })?;
    Ok(Json(ConflictResponse { conflict }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/conflicts", post(check_conflict))
}

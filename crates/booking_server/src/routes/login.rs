use axum::{extract::State, routing::post, Json, Router};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login - Exchange the shared password for a bearer token
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.auth().password_matches(&body.password) {
        warn!("event=login module=auth status=rejected");
        return Err(ApiError::Unauthorized("wrong password"));
    }

    let token = state
        .auth()
        .issue_token()
        .map_err(|err| ApiError::Internal(format!("token signing failed: {err}")))?;
    info!("event=login module=auth status=ok");
    Ok(Json(LoginResponse { token }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

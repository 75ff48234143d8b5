pub mod conflicts;
pub mod events;
pub mod login;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use booking_core::{BookingError, RepoError};
use log::error;
use serde::Serialize;

use crate::state::AppState;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Failure of a request, mapped to an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) | Self::NotFound(message) | Self::Conflict(message) => {
                message
            }
            Self::Unauthorized(message) => message.to_string(),
            Self::Internal(detail) => {
                error!("event=http_request module=http status=error error={detail}");
                "internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(_) | BookingError::ParticipantConflict { .. } => {
                Self::BadRequest(err.to_string())
            }
            BookingError::NotFound(_) => Self::NotFound(err.to_string()),
            BookingError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            BookingError::Repo(inner) => inner.into(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(_) => Self::BadRequest(err.to_string()),
            RepoError::NotFound(_) => Self::NotFound(err.to_string()),
            RepoError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health - Liveness probe, no auth
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: booking_core::core_version(),
    })
}

/// Routes reachable without a token.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(login::router())
}

/// Routes behind the bearer-token layer.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(conflicts::router())
}

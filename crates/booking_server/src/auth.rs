//! Shared-password login and bearer token checks.
//!
//! There is a single role: whoever knows the base password gets an `admin`
//! token valid for seven days.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::routes::ApiError;
use crate::state::AppState;

const TOKEN_ROLE: &str = "admin";
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims carried by issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Why a bearer token was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Missing,
    Invalid,
}

/// Issues and verifies HS256 tokens with one shared secret.
pub struct Authenticator {
    base_password: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    pub fn new(base_password: &str, secret: &str) -> Self {
        Self {
            base_password: base_password.trim().to_string(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Compares a submitted password with the configured one, both trimmed.
    pub fn password_matches(&self, candidate: &str) -> bool {
        !self.base_password.is_empty() && candidate.trim() == self.base_password
    }

    pub fn issue_token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_token_at(Utc::now())
    }

    pub fn issue_token_at(
        &self,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            role: TOKEN_ROLE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Validates an `Authorization` header value.
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, TokenError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(TokenError::Missing)?;

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("event=auth_verify module=auth status=rejected reason={err}");
                TokenError::Invalid
            })
    }
}

/// Rejects requests without a valid bearer token.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.auth().verify_header(header) {
        Ok(_) => next.run(req).await,
        Err(TokenError::Missing) => ApiError::Unauthorized("no token").into_response(),
        Err(TokenError::Invalid) => ApiError::Unauthorized("invalid token").into_response(),
    }
}

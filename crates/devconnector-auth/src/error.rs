//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message returned for every rejected token
///
/// The gate never tells the caller whether the token was missing, forged
/// or expired.
pub const UNAUTHORIZED_MESSAGE: &str = "Token is not valid";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing auth token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token lifetime out of range: {0}s")]
    InvalidTtl(i64),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Whether this error is a rejection by the request gate
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired
        )
    }

    /// Short label used in logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "missing",
            AuthError::InvalidToken => "invalid",
            AuthError::TokenExpired => "expired",
            AuthError::InvalidTtl(_) => "invalid_ttl",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::Jwt(_) => "jwt",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", UNAUTHORIZED_MESSAGE)
            }
            AuthError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS", "Invalid Credentials")
            }
            AuthError::InvalidTtl(_) | AuthError::PasswordHash(_) | AuthError::Jwt(_) => {
                tracing::error!("Authentication internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Server Error")
            }
        };

        let body = axum::Json(json!({
            "errors": [{
                "code": code,
                "message": message
            }]
        }));

        (status, body).into_response()
    }
}

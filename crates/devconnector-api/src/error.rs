//! API error types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devconnector_auth::error::UNAUTHORIZED_MESSAGE;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Generic message for failures whose details stay in the server log
const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// A single rejected input field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] devconnector_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] devconnector_auth::AuthError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] devconnector_github::GitHubError),
}

/// Unreadable request bodies are reported like any other invalid input
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    let body = axum::Json(json!({
        "errors": [{
            "code": code,
            "message": message
        }]
    }));
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                let errors: Vec<_> = fields
                    .into_iter()
                    .map(|f| {
                        json!({
                            "code": "VALIDATION_ERROR",
                            "field": f.field,
                            "message": f.message
                        })
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({ "errors": errors })),
                )
                    .into_response()
            }
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, "BAD_REQUEST", &msg),
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &msg),
            ApiError::Unauthorized => {
                error_body(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", UNAUTHORIZED_MESSAGE)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    SERVER_ERROR_MESSAGE,
                )
            }
            ApiError::Database(e) => match e {
                devconnector_db::DbError::NotFound(msg) => {
                    error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &msg)
                }
                devconnector_db::DbError::Duplicate(msg) => {
                    error_body(StatusCode::BAD_REQUEST, "DUPLICATE", &msg)
                }
                other => {
                    error!("Database error: {}", other);
                    error_body(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        SERVER_ERROR_MESSAGE,
                    )
                }
            },
            ApiError::Auth(e) => e.into_response(),
            ApiError::GitHub(e) => {
                debug!("GitHub lookup failed: {}", e);
                error_body(StatusCode::NOT_FOUND, "NOT_FOUND", "No Github profile found")
            }
        }
    }
}

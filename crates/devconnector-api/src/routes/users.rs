//! User registration routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use devconnector_db::utils::normalize_email;
use devconnector_db::{DbError, NewUser};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Validator;

use super::auth::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, hash_blocking};
use super::types::{RegisterRequest, TokenResponse};

const USER_EXISTS_MESSAGE: &str = "User already exists.";

/// Gravatar URL for an email: 200px, PG rated, mystery-person fallback
fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

/// POST /api/users
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = body?;
    let mut v = Validator::new();
    v.required("name", request.name.as_deref(), "Name is required.")
        .email("email", request.email.as_deref(), "Please enter a valid email.")
        .length(
            "password",
            request.password.as_deref(),
            MIN_PASSWORD_LENGTH,
            MAX_PASSWORD_LENGTH,
            "Please enter a password with 6 or more characters.",
        );
    v.finish()?;

    let name = request.name.unwrap_or_default().trim().to_string();
    let email = normalize_email(&request.email.unwrap_or_default());

    debug!("Registering user: {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest(USER_EXISTS_MESSAGE.to_string()));
    }

    let password_hash = hash_blocking(request.password.unwrap_or_default()).await?;

    let user = state
        .db
        .insert_user(NewUser {
            name,
            avatar: gravatar_url(&email),
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::BadRequest(USER_EXISTS_MESSAGE.to_string()),
            other => other.into(),
        })?;

    let token = state.jwt.generate_token(user.id)?;
    metrics::counter!("devconnector_registrations_total").increment(1);

    info!("Registered user {}", user.id);

    Ok(Json(TokenResponse { token }))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users", post(register))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_ignores_case_and_whitespace() {
        let url = gravatar_url(" Jane@Example.com ");
        assert_eq!(url, gravatar_url("jane@example.com"));
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=200&r=pg&d=mm"));

        let hash = url
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .split('?')
            .next()
            .unwrap();
        assert_eq!(hash.len(), 64);
    }
}

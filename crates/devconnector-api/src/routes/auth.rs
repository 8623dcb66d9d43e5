//! Authentication routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, put},
};
use devconnector_auth::{AuthError, AuthUser, dummy_hash, hash_password, verify_password};
use devconnector_db::User;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Validator;

use super::types::{ChangePasswordRequest, LoginRequest, MessageResponse, TokenResponse};

/// Minimum allowed password length
pub(crate) const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub(crate) const MAX_PASSWORD_LENGTH: usize = 256;

// ==================== Hashing Off The Event Loop ====================

/// Hash a password on the blocking thread pool
pub(crate) async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))?
        .map_err(ApiError::from)
}

/// Verify a password on the blocking thread pool
pub(crate) async fn verify_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))
}

// ==================== Auth Routes ====================

/// GET /api/auth
async fn current_user(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    // A valid token whose user has since been deleted no longer identifies anyone
    let user = state
        .db
        .get_user_by_id(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(user))
}

/// POST /api/auth
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = body?;
    let mut v = Validator::new();
    v.email("email", request.email.as_deref(), "Please include a valid email")
        .required("password", request.password.as_deref(), "Password is required")
        .check(
            "password",
            request
                .password
                .as_deref()
                .is_none_or(|p| p.chars().count() <= MAX_PASSWORD_LENGTH),
            "Password is too long",
        );
    v.finish()?;

    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    debug!("Login attempt for {}", email);

    // Always run a verification so unknown emails cost the same as bad passwords
    let user = state.db.get_user_by_email(&email).await?;
    let hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| dummy_hash().to_string());
    let password_valid = verify_blocking(password, hash).await?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("devconnector_logins_total", "outcome" => "rejected").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.jwt.generate_token(user.id)?;
    metrics::counter!("devconnector_logins_total", "outcome" => "success").increment(1);

    info!("User {} logged in", user.id);

    Ok(Json(TokenResponse { token }))
}

/// PUT /api/auth/password
async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    let mut v = Validator::new();
    v.required(
        "current_password",
        request.current_password.as_deref(),
        "Current password is required",
    )
    .length(
        "new_password",
        request.new_password.as_deref(),
        MIN_PASSWORD_LENGTH,
        MAX_PASSWORD_LENGTH,
        "Please enter a password with 6 or more characters.",
    );
    v.finish()?;

    let stored = state
        .db
        .get_user_by_id(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let current = request.current_password.unwrap_or_default();
    if !verify_blocking(current, stored.password_hash).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let password_hash = hash_blocking(request.new_password.unwrap_or_default()).await?;
    state.db.update_user_password(user.id, &password_hash).await?;

    info!("User {} changed their password", user.id);

    Ok(Json(MessageResponse::new("Password updated")))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth", get(current_user).post(login))
        .route("/api/auth/password", put(change_password))
}

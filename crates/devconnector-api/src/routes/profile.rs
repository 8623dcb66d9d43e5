//! Profile routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{delete, get, put},
};
use devconnector_auth::AuthUser;
use devconnector_db::{
    DbError, NewEducation, NewExperience, Profile, ProfileFields, Social,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{Validator, non_empty};

use super::types::{EducationRequest, ExperienceRequest, MessageResponse, ProfileRequest};

const PROFILE_NOT_FOUND: &str = "Profile not found";

/// Entry mutations on a missing profile are a 404
fn profile_missing(err: DbError) -> ApiError {
    match err {
        DbError::NotFound(_) => ApiError::NotFound(PROFILE_NOT_FOUND.to_string()),
        other => other.into(),
    }
}

// ==================== Profile Routes ====================

/// GET /api/profile/me
async fn my_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .get_profile_by_user(user.id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("There is no profile for this user".to_string()))?;

    Ok(Json(profile))
}

/// POST /api/profile
async fn upsert_profile(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(request) = body?;
    let skills = request
        .skills
        .map(|s| s.into_skills())
        .unwrap_or_default();

    let mut v = Validator::new();
    v.required("status", request.status.as_deref(), "Status is required")
        .check("skills", !skills.is_empty(), "Skills is required");
    v.finish()?;

    let fields = ProfileFields {
        company: non_empty(request.company),
        website: non_empty(request.website),
        location: non_empty(request.location),
        status: non_empty(request.status).unwrap_or_default(),
        skills,
        bio: non_empty(request.bio),
        github_username: non_empty(request.githubusername),
        social: Social {
            youtube: non_empty(request.youtube),
            twitter: non_empty(request.twitter),
            facebook: non_empty(request.facebook),
            linkedin: non_empty(request.linkedin),
            instagram: non_empty(request.instagram),
        },
    };

    let profile = state.db.upsert_profile(user.id, fields).await?;

    info!("Saved profile {} for user {}", profile.id, user.id);
    Ok(Json(profile))
}

/// GET /api/profile
async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.db.list_profiles().await?))
}

/// GET /api/profile/user/{user_id}
async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    // Malformed ids are indistinguishable from unknown ones
    let Ok(user_id) = user_id.parse::<i64>() else {
        return Err(ApiError::BadRequest(PROFILE_NOT_FOUND.to_string()));
    };

    let profile = state
        .db
        .get_profile_by_user(user_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest(PROFILE_NOT_FOUND.to_string()))?;

    Ok(Json(profile))
}

/// DELETE /api/profile
///
/// Removes the profile and the owning account.
async fn delete_account(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting account {}", user.id);

    if !state.db.delete_user(user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("Deleted account {}", user.id);
    Ok(Json(MessageResponse::new("User Deleted")))
}

// ==================== Experience & Education ====================

/// PUT /api/profile/experience
async fn add_experience(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<ExperienceRequest>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(request) = body?;
    let mut v = Validator::new();
    v.required("title", request.title.as_deref(), "Title is required")
        .required("company", request.company.as_deref(), "Company is required")
        .required("from", request.from.as_deref(), "From date is required");
    let from = v.date("from", request.from.as_deref(), "From date must be a valid date");
    let to = v.date("to", request.to.as_deref(), "To date must be a valid date");
    v.finish()?;

    let from = from.ok_or_else(|| ApiError::BadRequest("From date is required".to_string()))?;

    let profile = state
        .db
        .add_experience(
            user.id,
            NewExperience {
                title: non_empty(request.title).unwrap_or_default(),
                company: non_empty(request.company).unwrap_or_default(),
                location: non_empty(request.location),
                from,
                to,
                current: request.current.unwrap_or(false),
                description: non_empty(request.description),
            },
        )
        .await
        .map_err(profile_missing)?;

    debug!("Added experience to profile {}", profile.id);
    Ok(Json(profile))
}

/// DELETE /api/profile/experience/{exp_id}
async fn delete_experience(
    user: AuthUser,
    State(state): State<AppState>,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .remove_experience(user.id, &exp_id)
        .await
        .map_err(profile_missing)?;

    Ok(Json(profile))
}

/// PUT /api/profile/education
async fn add_education(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<EducationRequest>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(request) = body?;
    let mut v = Validator::new();
    v.required("school", request.school.as_deref(), "School is required")
        .required("degree", request.degree.as_deref(), "Degree is required")
        .required(
            "fieldofstudy",
            request.fieldofstudy.as_deref(),
            "Field of Study is required",
        )
        .required("from", request.from.as_deref(), "From date is required");
    let from = v.date("from", request.from.as_deref(), "From date must be a valid date");
    let to = v.date("to", request.to.as_deref(), "To date must be a valid date");
    v.finish()?;

    let from = from.ok_or_else(|| ApiError::BadRequest("From date is required".to_string()))?;

    let profile = state
        .db
        .add_education(
            user.id,
            NewEducation {
                school: non_empty(request.school).unwrap_or_default(),
                degree: non_empty(request.degree).unwrap_or_default(),
                field_of_study: non_empty(request.fieldofstudy).unwrap_or_default(),
                from,
                to,
                current: request.current.unwrap_or(false),
                description: non_empty(request.description),
            },
        )
        .await
        .map_err(profile_missing)?;

    debug!("Added education to profile {}", profile.id);
    Ok(Json(profile))
}

/// DELETE /api/profile/education/{edu_id}
async fn delete_education(
    user: AuthUser,
    State(state): State<AppState>,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .remove_education(user.id, &edu_id)
        .await
        .map_err(profile_missing)?;

    Ok(Json(profile))
}

// ==================== GitHub ====================

/// GET /api/profile/github/{username}
async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.github.list_repos(&username).await?))
}

/// Create profile routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profile",
            get(list_profiles).post(upsert_profile).delete(delete_account),
        )
        .route("/api/profile/me", get(my_profile))
        .route("/api/profile/user/{user_id}", get(profile_by_user))
        .route("/api/profile/experience", put(add_experience))
        .route("/api/profile/experience/{exp_id}", delete(delete_experience))
        .route("/api/profile/education", put(add_education))
        .route("/api/profile/education/{edu_id}", delete(delete_education))
        .route("/api/profile/github/{username}", get(github_repos))
}

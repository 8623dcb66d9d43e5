//! Request gate for Axum
//!
//! Reads the token from the request, verifies it and binds the subject to
//! the request as an [`AuthUser`]. Handlers opt in by taking `AuthUser` as
//! an extractor argument.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Header carrying the auth token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated user bound to the current request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        Ok(Self {
            id: claims.subject_id()?,
        })
    }
}

/// Find the token in `x-auth-token`, falling back to a bearer Authorization header
fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        let token = value.to_str().map_err(|_| AuthError::InvalidToken)?.trim();
        if !token.is_empty() {
            return Ok(token);
        }
    }

    match headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidToken),
        None => Err(AuthError::MissingToken),
    }
}

/// Run the gate against a set of request headers
pub fn authenticate(headers: &HeaderMap, jwt: &JwtManager) -> Result<AuthUser, AuthError> {
    let result = extract_token(headers)
        .and_then(|token| jwt.verify(token))
        .and_then(|claims| AuthUser::from_claims(&claims));

    match &result {
        Ok(user) => debug!("Authenticated user {}", user.id),
        Err(e) => {
            debug!("Request rejected by auth gate: {}", e.reason());
            metrics::counter!("devconnector_auth_rejections_total", "reason" => e.reason())
                .increment(1);
        }
    }

    result
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = Arc::<JwtManager>::from_ref(state);
        let user = authenticate(&parts.headers, &jwt)?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn headers(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_extracts_custom_header() {
        let jwt = JwtManager::new("secret", 3600);
        let token = jwt.generate_token(9).unwrap();

        let user = authenticate(&headers(AUTH_TOKEN_HEADER, &token), &jwt).unwrap();
        assert_eq!(user, AuthUser { id: 9 });
    }

    #[test]
    fn test_extracts_bearer_header() {
        let jwt = JwtManager::new("secret", 3600);
        let token = jwt.generate_token(9).unwrap();

        let user = authenticate(&headers("authorization", &format!("Bearer {}", token)), &jwt)
            .unwrap();
        assert_eq!(user.id, 9);
    }

    #[test]
    fn test_rejection_reasons_are_distinguished() {
        let jwt = JwtManager::new("secret", 3600);

        assert!(matches!(
            authenticate(&HeaderMap::new(), &jwt),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            authenticate(&headers(AUTH_TOKEN_HEADER, "garbage"), &jwt),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            authenticate(&headers("authorization", "Basic dXNlcjpwYXNz"), &jwt),
            Err(AuthError::InvalidToken)
        ));

        let expired = jwt.issue(9, 0).unwrap();
        assert!(matches!(
            authenticate(&headers(AUTH_TOKEN_HEADER, &expired), &jwt),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_extractor_rejects_uniformly() {
        let jwt = Arc::new(JwtManager::new("secret", 3600));
        let app = Router::new()
            .route("/me", get(|user: AuthUser| async move { Json(user) }))
            .with_state(jwt.clone());

        let ok = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(AUTH_TOKEN_HEADER, jwt.generate_token(3).unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        for token in [None, Some("garbage".to_string()), Some(jwt.issue(3, 0).unwrap())] {
            let mut request = Request::builder().uri("/me");
            if let Some(token) = token {
                request = request.header(AUTH_TOKEN_HEADER, token);
            }
            let response = app
                .clone()
                .oneshot(request.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}

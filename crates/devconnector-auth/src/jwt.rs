//! JWT token management

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// The user ID this token was issued for
    pub fn subject_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// JWT manager for token issuance and verification
///
/// Built once at startup from the configured secret and shared read-only.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Lifetime of tokens issued by `generate_token`, in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl_secs
    }

    /// Generate a token for a user with the configured lifetime
    pub fn generate_token(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue(user_id, self.token_ttl_secs)
    }

    /// Issue a token for `user_id` that expires `ttl_secs` from now
    pub fn issue(&self, user_id: i64, ttl_secs: i64) -> Result<String, AuthError> {
        self.issue_at(user_id, ttl_secs, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: i64, ttl_secs: i64, now: i64) -> Result<String, AuthError> {
        let exp = now
            .checked_add(ttl_secs)
            .ok_or(AuthError::InvalidTtl(ttl_secs))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp,
        };

        debug!("Issuing token for user {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token against an explicit clock
    ///
    /// Signature problems map to `InvalidToken`; a token whose expiry is at
    /// or before `now` maps to `TokenExpired`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below so it can be reported separately
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        if token_data.claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

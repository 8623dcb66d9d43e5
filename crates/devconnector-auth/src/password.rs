//! Password hashing using Argon2id

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;
use tracing::warn;

use crate::error::AuthError;

/// Valid Argon2 digest used when a real one is unavailable
const FALLBACK_DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let secret = SaltString::generate(&mut OsRng);
    hash_password(secret.as_str()).unwrap_or_else(|_| FALLBACK_DUMMY_HASH.to_string())
});

/// Hash a password with a fresh random salt
///
/// The returned PHC string embeds the algorithm parameters and the salt,
/// so verification needs nothing but the digest.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a digest
///
/// Comparison is constant-time. A malformed digest never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password digest is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// A digest of an unknown random secret
///
/// Login verifies against this when the account does not exist, so unknown
/// emails cost the same as wrong passwords.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}

//! DevConnector Authentication
//!
//! This crate provides password hashing, JWT issuance and verification,
//! and the request gate that binds a verified token to a user identity.

pub mod error;
pub mod gate;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use gate::{AUTH_TOKEN_HEADER, AuthUser, authenticate};
pub use jwt::{Claims, JwtManager};
pub use password::{dummy_hash, hash_password, verify_password};

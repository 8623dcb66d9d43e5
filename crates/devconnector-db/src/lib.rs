//! DevConnector Database Layer
//!
//! This crate provides the persistence layer for DevConnector: user
//! identities (the credential store) and developer profiles with their
//! nested experience and education entries, using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

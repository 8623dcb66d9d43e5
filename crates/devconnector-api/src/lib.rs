//! DevConnector REST API
//!
//! This crate provides the Axum-based HTTP API for DevConnector:
//! registration and login, the authenticated user endpoint, developer
//! profiles and the GitHub repository proxy.

pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::{ApiError, FieldError};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

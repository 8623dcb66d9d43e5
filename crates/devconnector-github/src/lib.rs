//! DevConnector GitHub Client
//!
//! This crate provides the client used to list a GitHub user's public
//! repositories on behalf of the profile API.

pub mod client;
pub mod error;

pub use client::{GitHubClient, GitHubClientConfig};
pub use error::GitHubError;

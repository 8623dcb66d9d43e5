//! GitHub client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub user not found: {0}")]
    NotFound(String),

    #[error("GitHub returned error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

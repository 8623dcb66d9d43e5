//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable that overrides `auth.jwt_secret`
pub const JWT_SECRET_ENV: &str = "DEVCONNECTOR_JWT_SECRET";
/// Environment variable that overrides `github.token`
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Longest accepted token lifetime (one year)
const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "./data/devconnector.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_ttl_secs() -> i64 {
    360_000
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("devconnector/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_github_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file, then apply environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            let config = Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?;
            info!("Loaded configuration from {}", path);
            config
        } else {
            info!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        if config.auth.jwt_secret == default_jwt_secret() {
            warn!(
                "Using the default JWT secret; set {} or auth.jwt_secret before deploying",
                JWT_SECRET_ENV
            );
        }

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply secrets supplied through the environment
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if let Some(token) = lookup(GITHUB_TOKEN_ENV).filter(|s| !s.is_empty()) {
            self.github.token = Some(token);
        }
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.auth.token_ttl_secs) {
            anyhow::bail!(
                "auth.token_ttl_secs must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS,
                self.auth.token_ttl_secs
            );
        }
        if self.database.path.trim().is_empty() {
            anyhow::bail!("database.path must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_secs, 360_000);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_secs, 360_000);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\nport = 1").is_err());
        assert!(Config::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            JWT_SECRET_ENV => Some("from-env".to_string()),
            GITHUB_TOKEN_ENV => Some("ghp_token".to_string()),
            _ => None,
        });

        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.github.token.as_deref(), Some("ghp_token"));

        // Empty variables are ignored
        let mut config = Config::default();
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.auth.jwt_secret, default_jwt_secret());
        assert!(config.github.token.is_none());
    }

    #[test]
    fn test_validate_rejects_unusable_auth() {
        let mut config = Config::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = i64::MAX;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/devconnector.toml").unwrap();
        assert_eq!(config.server.port, 5000);
    }
}

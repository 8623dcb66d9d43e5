//! GitHub REST API client

use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::GitHubError;

/// Number of repositories returned per profile
const REPOS_PER_PAGE: &str = "5";

/// GitHub client configuration
#[derive(Clone, Debug)]
pub struct GitHubClientConfig {
    /// Base URL of the GitHub REST API
    pub api_url: String,
    /// Personal access token sent as `Authorization: token ...`
    pub token: Option<String>,
    /// User agent (GitHub rejects requests without one)
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: concat!("devconnector/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// GitHub API client
pub struct GitHubClient {
    config: GitHubClientConfig,
    base_url: Url,
    client: Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| GitHubError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(config.api_url.clone()));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Created GitHub client for {}", config.api_url);

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// URL listing the newest repositories of `username`
    fn repos_url(&self, username: &str) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", REPOS_PER_PAGE)
            .append_pair("sort", "created:asc");
        Ok(url)
    }

    /// List a user's public repositories
    ///
    /// The upstream JSON is returned untouched.
    pub async fn list_repos(&self, username: &str) -> Result<Value, GitHubError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GitHubError::NotFound(username.to_string()));
        }

        let url = self.repos_url(username)?;
        debug!("Fetching repositories: {}", url);

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            request = request.header(header::AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(username.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("GitHub returned {} for {}", status, username);
            return Err(GitHubError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
    };
    use serde_json::json;

    async fn fake_github() -> String {
        async fn repos(Path(user): Path<String>, headers: HeaderMap) -> Result<Json<Value>, AxumStatus> {
            match user.as_str() {
                "octocat" => {
                    let auth = headers
                        .get("authorization")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Ok(Json(json!([{ "name": "hello-world", "auth": auth }])))
                }
                "broken" => Err(AxumStatus::INTERNAL_SERVER_ERROR),
                _ => Err(AxumStatus::NOT_FOUND),
            }
        }

        let app = Router::new().route("/users/{user}/repos", get(repos));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(api_url: &str, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(GitHubClientConfig {
            api_url: api_url.to_string(),
            token: token.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_repos_url() {
        let client = client("https://api.github.com", None);
        let url = client.repos_url("octocat").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/octocat/repos?per_page=5&sort=created%3Aasc"
        );
    }

    #[test]
    fn test_repos_url_escapes_username() {
        let client = client("https://example.com/api/", None);
        let url = client.repos_url("../admin").unwrap();
        assert!(url.path().starts_with("/api/users/"));
        assert!(!url.path().contains("/admin/"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GitHubClient::new(GitHubClientConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(GitHubError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_list_repos_sends_token() {
        let base = fake_github().await;
        let client = client(&base, Some("abc123"));

        let repos = client.list_repos("octocat").await.unwrap();
        assert_eq!(repos[0]["name"], "hello-world");
        assert_eq!(repos[0]["auth"], "token abc123");
    }

    #[tokio::test]
    async fn test_list_repos_failures() {
        let base = fake_github().await;
        let client = client(&base, None);

        assert!(matches!(
            client.list_repos("ghost").await,
            Err(GitHubError::NotFound(_))
        ));
        assert!(matches!(
            client.list_repos("broken").await,
            Err(GitHubError::Upstream { status: 500, .. })
        ));
        assert!(matches!(
            client.list_repos("  ").await,
            Err(GitHubError::NotFound(_))
        ));
    }
}

//! Application state

use axum::extract::FromRef;
use devconnector_auth::JwtManager;
use devconnector_db::Database;
use devconnector_github::GitHubClient;
use std::sync::Arc;

/// Prometheus exporter handle used by the metrics endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub github: Arc<GitHubClient>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>, github: Arc<GitHubClient>) -> Self {
        Self { db, jwt, github }
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

//! API routes

mod auth;
mod health;
mod profile;
pub mod types;
mod users;

use axum::{Router, extract::State, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::{AppState, MetricsHandle};

/// GET /metrics - Prometheus metrics endpoint
async fn get_metrics(State(handle): State<Arc<MetricsHandle>>) -> String {
    handle.render()
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(auth::routes())
        .merge(profile::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(get_metrics))
                .with_state(handle),
        );
    }

    router.layer(CorsLayer::permissive())
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::core::config::Config;

pub(super) mod jobs;
pub(super) mod metrics;
pub(super) mod submissions;

/// Fallback when no route matches.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub(crate) fn server_router(config: Arc<Config>) -> Router {
    let v1_routes = Router::new()
        .nest("/submissions", submissions::submission_router(config.clone()))
        .nest("/jobs", jobs::job_router(config.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1_routes)
        .nest("/api/x", metrics::metrics_router(config))
        .fallback(handler_404)
}

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::instrument;

use crate::core::config::Config;
use crate::error::JobError;
use crate::server::error::{ApiError, ApiResult};
use crate::server::types::{HistoryResponse, MetricsQuery, MetricsResponse};

/// Read-only query surface over the record store: the full verification
/// record for one user, straight from the latest committed state.
#[instrument(skip(config), fields(discord_id = %query.discord_id))]
async fn handle_get_metrics(State(config): State<Arc<Config>>, Query(query): Query<MetricsQuery>) -> ApiResult {
    let record = config
        .database()
        .get_record_by_discord_id(&query.discord_id)
        .await
        .map_err(JobError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("no verification record for discord_id {}", query.discord_id)))?;

    Ok(Json(MetricsResponse::from(record)).into_response())
}

const HISTORY_LIMIT: i64 = 50;

/// Recent verification attempts for one user, newest first.
#[instrument(skip(config), fields(discord_id = %query.discord_id))]
async fn handle_get_history(State(config): State<Arc<Config>>, Query(query): Query<MetricsQuery>) -> ApiResult {
    let entries = config
        .database()
        .get_history_for_user(&query.discord_id, HISTORY_LIMIT)
        .await
        .map_err(JobError::from)?;
    let entries: Vec<HistoryResponse> = entries.into_iter().map(HistoryResponse::from).collect();
    Ok(Json(entries).into_response())
}

pub(crate) fn metrics_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/metrics", get(handle_get_metrics))
        .route("/history", get(handle_get_history))
        .with_state(config)
}

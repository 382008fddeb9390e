use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::core::config::Config;
use crate::error::JobError;
use crate::server::error::{ApiError, ApiResult};
use crate::server::types::{ApiResponse, JobId, JobStatusResponse, SubmissionAccepted};
use crate::worker::event_handler::service::JobHandlerService;

/// Job status by id, for operator visibility.
#[instrument(skip(config), fields(job_id = %id))]
async fn handle_get_job_request(Path(JobId { id }): Path<JobId>, State(config): State<Arc<Config>>) -> ApiResult {
    let job_id = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidId(id.clone()))?;
    let job = config
        .database()
        .get_job_by_id(job_id)
        .await
        .map_err(JobError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("job {job_id} does not exist")))?;

    Ok(Json(ApiResponse::success_with_data(
        JobStatusResponse {
            id: job.id,
            status: job.status.to_string(),
            claimed_handle: job.claimed_handle,
            profile_link: job.profile_link,
            failure_reason: job.failure_reason,
        },
        None,
    ))
    .into_response())
}

/// Operator-triggered retry of a failed or expired job. Re-enqueues the
/// same claim as a fresh job; duplicate suppression applies as usual.
#[instrument(skip(config), fields(job_id = %id))]
async fn handle_retry_job_request(Path(JobId { id }): Path<JobId>, State(config): State<Arc<Config>>) -> ApiResult {
    let job_id = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidId(id.clone()))?;
    let new_job_id = JobHandlerService::retry_job(job_id, config).await?;
    info!(%new_job_id, "Job retry initiated");
    Ok(Json(ApiResponse::success_with_data(
        SubmissionAccepted { job_id: new_job_id },
        Some(format!("job {job_id} re-enqueued as {new_job_id}")),
    ))
    .into_response())
}

pub(crate) fn job_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/:id", get(handle_get_job_request))
        .route("/:id/retry", post(handle_retry_job_request))
        .with_state(config)
}

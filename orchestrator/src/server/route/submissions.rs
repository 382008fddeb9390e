use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::server::error::ApiResult;
use crate::server::types::{ApiResponse, SubmissionAccepted};
use crate::types::submission::SubmissionRequest;
use crate::worker::event_handler::service::JobHandlerService;

/// Inbound surface for the chat gateway: validates a submission and queues
/// the verification job. Rejections come back as specific 4xx reasons so
/// the submitter can fix the submission; duplicates come back as 409.
#[instrument(skip(config, payload), fields(discord_id = %payload.discord_id))]
async fn handle_create_submission(
    State(config): State<Arc<Config>>,
    Json(payload): Json<SubmissionRequest>,
) -> ApiResult {
    let job_id = JobHandlerService::create_job(&payload, config).await?;
    info!(%job_id, "Submission accepted");
    Ok(Json(ApiResponse::success_with_data(
        SubmissionAccepted { job_id },
        Some("submission accepted for verification".to_string()),
    ))
    .into_response())
}

pub(crate) fn submission_router(config: Arc<Config>) -> Router {
    Router::new().route("/", post(handle_create_submission)).with_state(config)
}

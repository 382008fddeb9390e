use rstest::rstest;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::core::config::Config;
use crate::server::setup_server;
use crate::server::types::{ApiResponse, MetricsResponse, SubmissionAccepted};
use crate::tests::config::{TestConfigBuilder, TestServices};
use crate::tests::utils::{build_record, build_submission};
use crate::types::jobs::JobStatus;
use crate::worker::event_handler::service::JobHandlerService;

async fn setup_api() -> (SocketAddr, Arc<Config>, TestServices) {
    let services = TestConfigBuilder::new().build().await;
    let config = services.config.clone();
    let (address, _handle) = setup_server(config.clone()).await.expect("Failed to start server");
    (address, config, services)
}

#[rstest]
#[tokio::test]
async fn metrics_for_an_unknown_user_is_a_404() {
    let (address, _config, _services) = setup_api().await;

    let response = reqwest::get(format!("http://{address}/api/x/metrics?discord_id=nobody")).await.unwrap();
    assert_eq!(response.status(), 404);

    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(body.message.unwrap().contains("no verification record"));
}

#[rstest]
#[tokio::test]
async fn metrics_returns_the_full_record() {
    let (address, config, _services) = setup_api().await;

    let record = build_record("alice-discord-id", "alice", true);
    config.database().upsert_record(&record).await.unwrap();

    let response =
        reqwest::get(format!("http://{address}/api/x/metrics?discord_id=alice-discord-id")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: MetricsResponse = response.json().await.unwrap();
    assert_eq!(body.discord_id, "alice-discord-id");
    assert_eq!(body.x_username, "alice");
    assert!(body.verified);
    assert_eq!(body.role_assigned.as_deref(), Some("Signal Lite"));
    assert_eq!(body.last_verify_timestamp, record.last_verify_timestamp.timestamp());
}

#[rstest]
#[tokio::test]
async fn history_lists_past_attempts_newest_first() {
    let (address, config, _services) = setup_api().await;

    let request = build_submission("alice", "https://x.com/alice/status/1");
    let job_id = JobHandlerService::create_job(&request, config.clone()).await.unwrap();
    JobHandlerService::apply_verdict(
        &crate::tests::utils::build_verdict(job_id, true, 0.9, Some("Top Signal")),
        config.clone(),
    )
    .await
    .unwrap();

    let response =
        reqwest::get(format!("http://{address}/api/x/history?discord_id=alice-discord-id")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Vec<crate::server::types::HistoryResponse> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].claimed_handle, "alice");
    assert!(body[0].verified);
}

#[rstest]
#[tokio::test]
async fn submission_endpoint_accepts_and_suppresses_duplicates() {
    let (address, config, _services) = setup_api().await;
    let client = reqwest::Client::new();
    let request = build_submission("alice", "https://x.com/alice/status/111");

    let response = client
        .post(format!("http://{address}/api/v1/submissions"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: ApiResponse<SubmissionAccepted> = response.json().await.unwrap();
    let job_id = body.data.unwrap().job_id;
    assert_eq!(config.database().get_job_by_id(job_id).await.unwrap().unwrap().status, JobStatus::Created);

    // Resubmission while the first job is in flight
    let duplicate = client
        .post(format!("http://{address}/api/v1/submissions"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), 409);
}

#[rstest]
#[tokio::test]
async fn invalid_submissions_come_back_as_422_with_the_reason() {
    let (address, _config, _services) = setup_api().await;
    let client = reqwest::Client::new();

    let mut request = build_submission("alice", "https://x.com/bob/status/222");
    let response = client
        .post(format!("http://{address}/api/v1/submissions"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(body.message.unwrap().contains("does not match"));

    request = build_submission("alice", "https://x.com/alice/status/1");
    request.attachment_count = 0;
    let response = client
        .post(format!("http://{address}/api/v1/submissions"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[rstest]
#[tokio::test]
async fn job_status_and_retry_endpoints_work() {
    let (address, config, services) = setup_api().await;
    let client = reqwest::Client::new();

    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let response = client.get(format!("http://{address}/api/v1/jobs/{job_id}")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    // Retry is refused while the job is active
    let retry = client.post(format!("http://{address}/api/v1/jobs/{job_id}/retry")).send().await.unwrap();
    assert_eq!(retry.status(), 422);

    config
        .database()
        .update_job_status(job_id, &JobStatus::ACTIVE, JobStatus::Expired, None)
        .await
        .unwrap();
    let retry = client.post(format!("http://{address}/api/v1/jobs/{job_id}/retry")).send().await.unwrap();
    assert_eq!(retry.status(), 200);
}

#[rstest]
#[tokio::test]
async fn bogus_job_ids_are_a_400() {
    let (address, _config, _services) = setup_api().await;
    let response = reqwest::get(format!("http://{address}/api/v1/jobs/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), 400);
}

use rstest::rstest;

use crate::core::client::verifier::{MockHandleVerifier, VerifierError};
use crate::error::JobError;
use crate::tests::config::TestConfigBuilder;
use crate::tests::utils::{build_aged_job, build_submission};
use crate::types::jobs::{idempotency_key, JobStatus};
use crate::types::queue::{JobQueueMessage, QueueType};
use crate::types::submission::SubmissionRequest;
use crate::types::verdict::Verdict;
use crate::validation::RejectionReason;
use crate::worker::event_handler::service::JobHandlerService;

async fn consume_job_message(services: &crate::tests::config::TestServices) -> JobQueueMessage {
    let delivery = services.config.queue().consume_message_from_queue(QueueType::JobProcessing).await.unwrap();
    let message = delivery.payload_serde_json::<JobQueueMessage>().unwrap().unwrap();
    delivery.ack().await.map_err(|e| e.0).unwrap();
    message
}

#[rstest]
#[tokio::test]
async fn accepted_submission_creates_a_job_and_publishes_it() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");

    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Created);
    assert_eq!(job.claimed_handle, "alice");
    assert_eq!(job.profile_link, "https://x.com/alice/status/111");
    assert_eq!(job.idempotency_key, idempotency_key("alice-discord-id", "https://x.com/alice/status/111"));

    let message = consume_job_message(&services).await;
    assert_eq!(message.id, job_id);
}

#[rstest]
#[tokio::test]
async fn rejected_submission_creates_nothing() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/bob/status/222");

    let result = JobHandlerService::create_job(&request, services.config.clone()).await;
    assert!(matches!(
        result,
        Err(JobError::Rejected(RejectionReason::HandleMismatch { .. }))
    ));

    let active = services.config.database().list_jobs_by_status(&JobStatus::ACTIVE).await.unwrap();
    assert!(active.is_empty());
}

#[rstest]
#[tokio::test]
async fn duplicate_submission_yields_exactly_one_active_job() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");

    JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();
    let second = JobHandlerService::create_job(&request, services.config.clone()).await;
    assert!(matches!(second, Err(JobError::DuplicateInFlight)));

    let active = services.config.database().list_jobs_by_status(&JobStatus::ACTIVE).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[rstest]
#[tokio::test]
async fn different_links_are_distinct_jobs() {
    let services = TestConfigBuilder::new().build().await;

    JobHandlerService::create_job(&build_submission("alice", "https://x.com/alice/status/1"), services.config.clone())
        .await
        .unwrap();
    JobHandlerService::create_job(&build_submission("alice", "https://x.com/alice/status/2"), services.config.clone())
        .await
        .unwrap();

    let active = services.config.database().list_jobs_by_status(&JobStatus::ACTIVE).await.unwrap();
    assert_eq!(active.len(), 2);
}

#[rstest]
#[tokio::test]
async fn processing_produces_a_verdict_on_the_verdict_queue() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    JobHandlerService::process_job(job_id, services.config.clone()).await.unwrap();

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::PendingVerdict);

    let delivery =
        services.config.queue().consume_message_from_queue(QueueType::VerdictApplication).await.unwrap();
    let verdict = delivery.payload_serde_json::<Verdict>().unwrap().unwrap();
    delivery.ack().await.map_err(|e| e.0).unwrap();
    assert_eq!(verdict.job_id, job_id);
    assert_eq!(verdict.verified, verdict.role_name.is_some());
}

#[rstest]
#[tokio::test]
async fn worker_failure_marks_the_job_failed() {
    let mut verifier = MockHandleVerifier::new();
    verifier
        .expect_verify()
        .returning(|_| Err(VerifierError::WorkerFailed("ocr backend down".to_string())));
    let services = TestConfigBuilder::new().configure_verifier(Box::new(verifier)).build().await;

    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();
    JobHandlerService::process_job(job_id, services.config.clone()).await.unwrap();

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.failure_reason.unwrap().contains("ocr backend down"));
}

#[rstest]
#[tokio::test]
async fn redelivered_message_for_a_settled_job_is_a_noop() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    services
        .config
        .database()
        .update_job_status(job_id, &JobStatus::ACTIVE, JobStatus::Completed, None)
        .await
        .unwrap();

    // Does not error and does not resurrect the job
    JobHandlerService::process_job(job_id, services.config.clone()).await.unwrap();
    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn expired_jobs_free_their_key_for_resubmission() {
    let services = TestConfigBuilder::new().build().await;

    let aged = build_aged_job("alice", "https://x.com/alice/status/111", 25);
    services.config.database().create_job(&aged).await.unwrap();

    let expired = JobHandlerService::expire_overdue_jobs(services.config.clone()).await.unwrap();
    assert_eq!(expired, vec![aged.id]);
    assert_eq!(
        services.config.database().get_job_by_id(aged.id).await.unwrap().unwrap().status,
        JobStatus::Expired
    );

    // Same identity + link is accepted again now
    let request = build_submission("alice", "https://x.com/alice/status/111");
    JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn retry_re_enqueues_a_settled_job_as_a_fresh_one() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();
    consume_job_message(&services).await;

    services
        .config
        .database()
        .update_job_status(job_id, &JobStatus::ACTIVE, JobStatus::Failed, Some("expired".to_string()))
        .await
        .unwrap();

    let new_job_id = JobHandlerService::retry_job(job_id, services.config.clone()).await.unwrap();
    assert_ne!(new_job_id, job_id);

    let message = consume_job_message(&services).await;
    assert_eq!(message.id, new_job_id);

    // Retrying an active job is refused
    let again = JobHandlerService::retry_job(new_job_id, services.config.clone()).await;
    assert!(matches!(again, Err(JobError::InvalidStatus { .. })));
}

#[rstest]
#[tokio::test]
async fn startup_requeue_republishes_unsettled_jobs() {
    let services = TestConfigBuilder::new().build().await;

    // A job row that never made it onto the transport (e.g. crash between
    // insert and publish)
    let orphan = crate::tests::utils::build_job("alice", "https://x.com/alice/status/111", JobStatus::Created);
    services.config.database().create_job(&orphan).await.unwrap();

    let requeued = JobHandlerService::requeue_unsettled_jobs(services.config.clone()).await.unwrap();
    assert_eq!(requeued, 1);

    let message = consume_job_message(&services).await;
    assert_eq!(message.id, orphan.id);
}

#[rstest]
#[tokio::test]
async fn wrong_channel_is_rejected_when_configured() {
    let services = TestConfigBuilder::new()
        .configure_validation_params(crate::types::params::ValidationParams {
            verify_channel_id: Some("the-one-channel".to_string()),
            accepted_hosts: vec!["x.com".to_string()],
        })
        .build()
        .await;

    let request = SubmissionRequest {
        channel_id: "some-other-channel".to_string(),
        ..build_submission("alice", "https://x.com/alice/status/111")
    };
    let result = JobHandlerService::create_job(&request, services.config.clone()).await;
    assert!(matches!(result, Err(JobError::Rejected(RejectionReason::WrongChannel))));
}

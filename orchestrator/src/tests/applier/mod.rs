use chrono::Utc;
use mockall::predicate::eq;
use rstest::rstest;

use crate::core::client::role::{MockRoleClient, RoleError};
use crate::tests::config::TestConfigBuilder;
use crate::tests::utils::{build_submission, build_verdict};
use crate::types::jobs::JobStatus;
use crate::types::verdict::OutcomeKind;
use crate::worker::event_handler::service::JobHandlerService;

#[rstest]
#[tokio::test]
async fn verified_verdict_updates_record_and_grants_the_role() {
    let mut role_client = MockRoleClient::new();
    role_client
        .expect_grant_role()
        .with(eq("alice-discord-id"), eq("Project A"))
        .times(1)
        .returning(|_, _| Ok(()));
    let services = TestConfigBuilder::new().configure_role_client(Box::new(role_client)).build().await;

    let before = Utc::now().timestamp();
    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let verdict = build_verdict(job_id, true, 0.92, Some("Project A"));
    let outcome = JobHandlerService::apply_verdict(&verdict, services.config.clone()).await.unwrap();

    assert_eq!(outcome.kind, OutcomeKind::Verified);
    assert_eq!(outcome.role_assigned.as_deref(), Some("Project A"));

    let record = services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert!(record.verified);
    assert_eq!(record.x_username, "alice");
    assert_eq!(record.last_score, Some(0.92));
    assert_eq!(record.role_assigned.as_deref(), Some("Project A"));
    assert!(record.last_verify_timestamp.timestamp() >= before);

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn applying_the_same_verdict_twice_changes_nothing() {
    let services = TestConfigBuilder::new().build().await;
    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let verdict = build_verdict(job_id, true, 0.92, Some("Project A"));
    JobHandlerService::apply_verdict(&verdict, services.config.clone()).await.unwrap();
    let record_after_first =
        services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();

    let second = JobHandlerService::apply_verdict(&verdict, services.config.clone()).await.unwrap();
    assert_eq!(second.kind, OutcomeKind::AlreadyApplied);

    let record_after_second =
        services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert_eq!(record_after_first, record_after_second);

    let history = services.config.database().get_history_for_user("alice-discord-id", 10).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[rstest]
#[tokio::test]
async fn unverified_verdict_fails_the_job_without_granting() {
    let mut role_client = MockRoleClient::new();
    role_client.expect_grant_role().times(0);
    let services = TestConfigBuilder::new().configure_role_client(Box::new(role_client)).build().await;

    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let verdict = build_verdict(job_id, false, 0.1, None);
    let outcome = JobHandlerService::apply_verdict(&verdict, services.config.clone()).await.unwrap();
    assert_eq!(outcome.kind, OutcomeKind::VerificationFailed);
    assert_eq!(outcome.role_assigned, None);

    let record = services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert!(!record.verified);
    assert_eq!(record.role_assigned, None);

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}

#[rstest]
#[tokio::test]
async fn role_grant_failure_is_surfaced_but_record_still_updates() {
    let mut role_client = MockRoleClient::new();
    role_client
        .expect_grant_role()
        .returning(|_, _| Err(RoleError::RequestFailed { status: 403, context: "assigning role to member" }));
    let services = TestConfigBuilder::new().configure_role_client(Box::new(role_client)).build().await;

    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    let verdict = build_verdict(job_id, true, 0.8, Some("Signal Amplifier"));
    let outcome = JobHandlerService::apply_verdict(&verdict, services.config.clone()).await.unwrap();
    assert_eq!(outcome.kind, OutcomeKind::VerifiedRoleGrantFailed);

    // Verification itself succeeded and is durably recorded
    let record = services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert!(record.verified);
    assert_eq!(record.role_assigned.as_deref(), Some("Signal Amplifier"));

    let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn a_later_failed_attempt_keeps_the_earlier_role() {
    let services = TestConfigBuilder::new().build().await;

    // First attempt verifies and assigns a role
    let first_request = build_submission("alice", "https://x.com/alice/status/1");
    let first_job = JobHandlerService::create_job(&first_request, services.config.clone()).await.unwrap();
    JobHandlerService::apply_verdict(
        &build_verdict(first_job, true, 0.95, Some("Top Signal")),
        services.config.clone(),
    )
    .await
    .unwrap();

    // Second attempt with a different link fails verification
    let second_request = build_submission("alice", "https://x.com/alice/status/2");
    let second_job = JobHandlerService::create_job(&second_request, services.config.clone()).await.unwrap();
    JobHandlerService::apply_verdict(&build_verdict(second_job, false, 0.2, None), services.config.clone())
        .await
        .unwrap();

    let record = services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert!(!record.verified);
    assert_eq!(record.role_assigned.as_deref(), Some("Top Signal"));

    let history = services.config.database().get_history_for_user("alice-discord-id", 10).await.unwrap();
    assert_eq!(history.len(), 2);
}

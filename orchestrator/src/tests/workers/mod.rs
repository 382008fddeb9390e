use mockall::predicate::eq;
use rstest::rstest;
use std::time::Duration;

use crate::core::client::role::MockRoleClient;
use crate::core::client::verifier::MockHandleVerifier;
use crate::tests::config::TestConfigBuilder;
use crate::tests::utils::build_submission;
use crate::types::jobs::JobStatus;
use crate::types::verdict::Verdict;
use crate::worker::event_handler::service::JobHandlerService;
use crate::worker::initialize_worker;

/// Drives the whole pipeline through the running workers: submit, let the
/// consumer loops claim the job, run the worker contract, apply the
/// verdict, then observe the record and the role grant.
#[rstest]
#[tokio::test]
async fn pipeline_processes_a_submission_end_to_end() {
    let mut verifier = MockHandleVerifier::new();
    verifier.expect_verify().returning(|job| {
        Ok(Verdict {
            job_id: job.id,
            score: 0.92,
            verified: true,
            role_name: Some("Project A".to_string()),
        })
    });

    let mut role_client = MockRoleClient::new();
    role_client
        .expect_grant_role()
        .with(eq("alice-discord-id"), eq("Project A"))
        .times(1)
        .returning(|_, _| Ok(()));

    let services = TestConfigBuilder::new()
        .configure_verifier(Box::new(verifier))
        .configure_role_client(Box::new(role_client))
        .build()
        .await;

    let controller = initialize_worker(services.config.clone()).await.unwrap();

    let request = build_submission("alice", "https://x.com/alice/status/111");
    let job_id = JobHandlerService::create_job(&request, services.config.clone()).await.unwrap();

    // Wait for the workers to settle the job
    let mut settled = false;
    for _ in 0..100 {
        let job = services.config.database().get_job_by_id(job_id).await.unwrap().unwrap();
        if job.status == JobStatus::Completed {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(settled, "job was not settled by the worker pool in time");

    let record = services.config.database().get_record_by_discord_id("alice-discord-id").await.unwrap().unwrap();
    assert!(record.verified);
    assert_eq!(record.last_score, Some(0.92));
    assert_eq!(record.role_assigned.as_deref(), Some("Project A"));

    controller.shutdown().await.unwrap();
}

#[rstest]
#[tokio::test]
async fn shutdown_stops_the_worker_pool() {
    let services = TestConfigBuilder::new().build().await;
    let controller = initialize_worker(services.config.clone()).await.unwrap();

    // Must return rather than hang on the suspended consumers
    tokio::time::timeout(Duration::from_secs(5), controller.shutdown())
        .await
        .expect("shutdown timed out")
        .unwrap();
}

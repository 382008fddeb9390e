use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::client::queue::QueueError;
use crate::core::config::Config;
use crate::error::JobError;
use crate::types::jobs::{JobStatus, VerificationJob};
use crate::types::queue::{JobQueueMessage, QueueType};
use crate::types::record::{HistoryEntry, VerificationRecord};
use crate::types::submission::{SubmissionRequest, ValidSubmission};
use crate::types::verdict::{ApplicationOutcome, OutcomeKind, Verdict};
use crate::utils::retry::with_backoff;
use crate::validation::validate;

const UPSERT_ATTEMPTS: u32 = 3;
const UPSERT_BASE_DELAY: Duration = Duration::from_millis(200);

pub struct JobHandlerService;

impl JobHandlerService {
    /// Validator entry point: raw submission in, queued job id out.
    pub async fn create_job(request: &SubmissionRequest, config: Arc<Config>) -> Result<Uuid, JobError> {
        let submission = validate(request, config.validation_params())?;
        Self::enqueue(submission, config).await
    }

    /// Inserts the job row (the atomic duplicate check) and hands it to the
    /// worker pool. The row comes first: a job that exists but was never
    /// published is recovered by the startup requeue or expiry, while a
    /// published message without a row would be unprocessable.
    pub async fn enqueue(submission: ValidSubmission, config: Arc<Config>) -> Result<Uuid, JobError> {
        let job = VerificationJob::new(
            submission.discord_id,
            submission.discord_username,
            submission.claimed_handle,
            submission.profile_link,
        );
        config.database().create_job(&job).await?;

        if let Err(e) = Self::publish_job(&job, &config).await {
            // Release the key right away instead of letting the row idle
            // until expiry
            let _ = config
                .database()
                .update_job_status(
                    job.id,
                    &JobStatus::ACTIVE,
                    JobStatus::Failed,
                    Some(format!("failed to publish job: {e}")),
                )
                .await;
            return Err(e);
        }

        info!(job_id = %job.id, handle = %job.claimed_handle, "Enqueued verification job");
        Ok(job.id)
    }

    async fn publish_job(job: &VerificationJob, config: &Arc<Config>) -> Result<(), JobError> {
        let payload = serde_json::to_string(&JobQueueMessage { id: job.id }).map_err(QueueError::Payload)?;
        config.queue().send_message(QueueType::JobProcessing, payload).await?;
        Ok(())
    }

    /// Claims a job and drives the worker contract. The verdict goes onto
    /// the verdict queue; worker failure marks the job failed.
    pub async fn process_job(id: Uuid, config: Arc<Config>) -> Result<(), JobError> {
        let job = config.database().get_job_by_id(id).await?.ok_or(JobError::NotFound(id))?;

        match job.status {
            // LockedForProcessing shows up when a message is redelivered
            // after a crash mid-processing; the claim below keeps this safe
            JobStatus::Created | JobStatus::LockedForProcessing => {}
            status => {
                warn!(job_id = %id, %status, "Skipping redelivered message for settled job");
                return Ok(());
            }
        }

        config
            .database()
            .update_job_status(id, &[JobStatus::Created], JobStatus::LockedForProcessing, None)
            .await?;
        debug!(job_id = %id, "Processing verification job");

        match config.verifier().verify(&job).await {
            Ok(verdict) => {
                config
                    .database()
                    .update_job_status(id, &[JobStatus::LockedForProcessing], JobStatus::PendingVerdict, None)
                    .await?;
                let payload = serde_json::to_string(&verdict).map_err(QueueError::Payload)?;
                config.queue().send_message(QueueType::VerdictApplication, payload).await?;
                info!(job_id = %id, verified = verdict.verified, "Worker produced a verdict");
                Ok(())
            }
            Err(e) => {
                error!(job_id = %id, error = %e, "Verification worker failed");
                config
                    .database()
                    .update_job_status(id, &JobStatus::ACTIVE, JobStatus::Failed, Some(e.to_string()))
                    .await?;
                Ok(())
            }
        }
    }

    /// Result applier: updates the record, grants the role, settles the
    /// job, and emits the notification payload.
    ///
    /// Idempotent on `job_id`: a redelivered verdict for a settled job is a
    /// no-op, and re-applying the same verdict writes identical values.
    pub async fn apply_verdict(verdict: &Verdict, config: Arc<Config>) -> Result<ApplicationOutcome, JobError> {
        let job = config.database().get_job_by_id(verdict.job_id).await?.ok_or(JobError::NotFound(verdict.job_id))?;

        if job.status.is_terminal() {
            debug!(job_id = %job.id, status = %job.status, "Verdict already applied");
            return Ok(ApplicationOutcome {
                job_id: job.id,
                discord_id: job.discord_id,
                kind: OutcomeKind::AlreadyApplied,
                score: None,
                role_assigned: None,
            });
        }

        let now = Utc::now();
        let role_assigned = if verdict.verified { verdict.role_name.clone() } else { None };
        let record = VerificationRecord {
            discord_id: job.discord_id.clone(),
            discord_username: job.discord_username.clone(),
            x_username: job.claimed_handle.clone(),
            verified: verdict.verified,
            last_verify_timestamp: now,
            last_score: Some(verdict.score),
            role_assigned: role_assigned.clone(),
        };

        with_backoff("upsert_record", UPSERT_ATTEMPTS, UPSERT_BASE_DELAY, || {
            config.database().upsert_record(&record)
        })
        .await?;

        config
            .database()
            .append_history(&HistoryEntry {
                discord_id: job.discord_id.clone(),
                discord_username: job.discord_username.clone(),
                claimed_handle: job.claimed_handle.clone(),
                verified: verdict.verified,
                score: Some(verdict.score),
                role_assigned: role_assigned.clone(),
                timestamp: now,
            })
            .await?;

        let mut kind = if verdict.verified { OutcomeKind::Verified } else { OutcomeKind::VerificationFailed };
        if let (true, Some(role_name)) = (verdict.verified, &verdict.role_name) {
            if let Err(e) = config.role_client().grant_role(&job.discord_id, role_name).await {
                // The record stays updated; the grant failure is its own
                // outcome so an operator knows to fix the role hierarchy
                warn!(job_id = %job.id, role = %role_name, error = %e, "Verified, but role grant failed");
                kind = OutcomeKind::VerifiedRoleGrantFailed;
            }
        }

        let settled = if verdict.verified { JobStatus::Completed } else { JobStatus::Failed };
        let reason = (!verdict.verified).then(|| "worker could not verify the claim".to_string());
        config.database().update_job_status(job.id, &JobStatus::ACTIVE, settled, reason).await?;

        info!(job_id = %job.id, outcome = %kind, "Applied verdict");
        Ok(ApplicationOutcome {
            job_id: job.id,
            discord_id: job.discord_id,
            kind,
            score: Some(verdict.score),
            role_assigned,
        })
    }

    /// Operator-triggered retry of a settled job. Never automatic: a retry
    /// re-runs the worker and may re-grant roles, so a human decides.
    pub async fn retry_job(id: Uuid, config: Arc<Config>) -> Result<Uuid, JobError> {
        let job = config.database().get_job_by_id(id).await?.ok_or(JobError::NotFound(id))?;
        if !matches!(job.status, JobStatus::Failed | JobStatus::Expired) {
            return Err(JobError::InvalidStatus { id, status: job.status, action: "retried" });
        }
        info!(job_id = %id, "Retrying job as a fresh submission");
        Self::enqueue(
            ValidSubmission {
                discord_id: job.discord_id,
                discord_username: job.discord_username,
                claimed_handle: job.claimed_handle,
                profile_link: job.profile_link,
            },
            config,
        )
        .await
    }

    /// Republishes jobs that were accepted but not settled when the
    /// process last stopped. Keeps enqueued jobs durable across restarts
    /// even on the in-process transport.
    pub async fn requeue_unsettled_jobs(config: Arc<Config>) -> Result<usize, JobError> {
        let jobs = config
            .database()
            .list_jobs_by_status(&[JobStatus::Created, JobStatus::LockedForProcessing])
            .await?;
        for job in &jobs {
            Self::publish_job(job, &config).await?;
        }
        if !jobs.is_empty() {
            info!(count = jobs.len(), "Re-enqueued unsettled jobs from a previous run");
        }
        Ok(jobs.len())
    }

    /// Expires every active job older than the configured TTL, releasing
    /// their idempotency keys.
    pub async fn expire_overdue_jobs(config: Arc<Config>) -> Result<Vec<Uuid>, JobError> {
        let ttl = config.service_params().job_ttl;
        let cutoff = Utc::now() - chrono::Duration::seconds(ttl.as_secs() as i64);
        let expired = config.database().expire_jobs_before(cutoff).await?;
        for id in &expired {
            warn!(job_id = %id, "Job expired before a verdict was applied");
        }
        Ok(expired)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use uuid::Uuid;

/// Lifecycle of a verification job.
///
/// A job is "active" (it holds its idempotency key) until it reaches one of
/// the terminal states. Terminal jobs are kept for auditing and release the
/// key for a future submission by the same identity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
pub enum JobStatus {
    /// Accepted by the validator and waiting for a worker to pick it up
    Created,
    /// A worker has claimed the job and is producing a verdict
    LockedForProcessing,
    /// The worker produced a verdict which has not been applied yet
    PendingVerdict,
    /// The verdict was applied and the record updated
    Completed,
    /// The worker failed or the verdict could not be applied
    Failed,
    /// The job sat unresolved past its TTL
    Expired,
}

impl JobStatus {
    /// Statuses under which a job still holds its idempotency key.
    pub const ACTIVE: [JobStatus; 3] = [JobStatus::Created, JobStatus::LockedForProcessing, JobStatus::PendingVerdict];

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Expired)
    }
}

/// The unit of queued work: one accepted handle-ownership claim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationJob {
    /// Opaque unique token identifying the job
    pub id: Uuid,
    /// Platform user identifier of the submitter
    pub discord_id: String,
    pub discord_username: String,
    /// Claimed handle, lowercased, no leading `@`
    pub claimed_handle: String,
    /// Normalized profile link the claim points at
    pub profile_link: String,
    /// Deterministic duplicate-suppression key, see [`idempotency_key`]
    pub idempotency_key: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Populated for `Failed` and `Expired` jobs
    pub failure_reason: Option<String>,
}

impl VerificationJob {
    pub fn new(
        discord_id: String,
        discord_username: String,
        claimed_handle: String,
        profile_link: String,
    ) -> Self {
        let now = Utc::now();
        let key = idempotency_key(&discord_id, &profile_link);
        Self {
            id: Uuid::new_v4(),
            discord_id,
            discord_username,
            claimed_handle,
            profile_link,
            idempotency_key: key,
            status: JobStatus::Created,
            created_at: now,
            updated_at: now,
            failure_reason: None,
        }
    }
}

/// Derives the duplicate-suppression key for a submission.
///
/// The link must already be normalized (lowercased host, no trailing slash)
/// so that resubmissions of the same proof hash identically.
pub fn idempotency_key(discord_id: &str, normalized_link: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(discord_id.as_bytes());
    hasher.update(b":");
    hasher.update(normalized_link.as_bytes());
    hex::encode(hasher.finalize())
}

use chrono::{Duration, SubsecRound, Utc};
use uuid::Uuid;

use crate::types::jobs::{idempotency_key, JobStatus, VerificationJob};
use crate::types::record::VerificationRecord;
use crate::types::submission::SubmissionRequest;
use crate::types::verdict::Verdict;

pub fn build_submission(handle: &str, link: &str) -> SubmissionRequest {
    SubmissionRequest {
        discord_id: format!("{handle}-discord-id"),
        discord_username: format!("{handle}#1"),
        channel_id: "chan-1".to_string(),
        body: format!("@{handle} {link}"),
        attachment_count: 1,
    }
}

/// A job row as the store would hold it: second-precision timestamps.
pub fn build_job(handle: &str, link: &str, status: JobStatus) -> VerificationJob {
    let now = Utc::now().trunc_subsecs(0);
    VerificationJob {
        id: Uuid::new_v4(),
        discord_id: format!("{handle}-discord-id"),
        discord_username: format!("{handle}#1"),
        claimed_handle: handle.to_string(),
        profile_link: link.to_string(),
        idempotency_key: idempotency_key(&format!("{handle}-discord-id"), link),
        status,
        created_at: now,
        updated_at: now,
        failure_reason: None,
    }
}

/// Like [`build_job`], but created in the past (for expiry tests).
pub fn build_aged_job(handle: &str, link: &str, age_hours: i64) -> VerificationJob {
    let mut job = build_job(handle, link, JobStatus::Created);
    job.created_at = job.created_at - Duration::hours(age_hours);
    job.updated_at = job.created_at;
    job
}

pub fn build_verdict(job_id: Uuid, verified: bool, score: f64, role_name: Option<&str>) -> Verdict {
    Verdict { job_id, score, verified, role_name: role_name.map(str::to_string) }
}

pub fn build_record(discord_id: &str, handle: &str, verified: bool) -> VerificationRecord {
    VerificationRecord {
        discord_id: discord_id.to_string(),
        discord_username: format!("{handle}#1"),
        x_username: handle.to_string(),
        verified,
        last_verify_timestamp: Utc::now().trunc_subsecs(0),
        last_score: Some(0.5),
        role_assigned: verified.then(|| "Signal Lite".to_string()),
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The worker's authoritative output for one job.
///
/// `role_name` is present iff `verified`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Verdict {
    pub job_id: Uuid,
    pub score: f64,
    pub verified: bool,
    pub role_name: Option<String>,
}

/// User-visible outcome category of a verdict application.
///
/// The gateway collaborator renders these; the pipeline only guarantees the
/// category is distinct enough for the submitter to self-correct or
/// escalate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum OutcomeKind {
    /// Verification succeeded and the role was granted
    Verified,
    /// Verification succeeded but the role grant failed; an operator must
    /// fix the role hierarchy
    VerifiedRoleGrantFailed,
    /// The worker could not verify the claim
    VerificationFailed,
    /// The verdict was already applied for this job (redelivery)
    AlreadyApplied,
}

/// Notification payload emitted by the result applier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationOutcome {
    pub job_id: Uuid,
    pub discord_id: String,
    pub kind: OutcomeKind,
    pub score: Option<f64>,
    pub role_assigned: Option<String>,
}

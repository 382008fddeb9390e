use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two hand-off points of the pipeline: accepted jobs flowing to the
/// worker pool, and verdicts flowing back to the applier.
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIter, Hash)]
pub enum QueueType {
    #[strum(serialize = "verify_job_processing")]
    JobProcessing,
    #[strum(serialize = "verify_verdict_application")]
    VerdictApplication,
}

/// Payload of the job-processing queue. The job body lives in the database;
/// the message only carries the id so redeliveries always observe current
/// job state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobQueueMessage {
    pub id: Uuid,
}

use thiserror::Error;
use uuid::Uuid;

use crate::core::client::database::DatabaseError;
use crate::core::client::queue::QueueError;
use crate::types::jobs::JobStatus;
use crate::validation::RejectionReason;

/// Errors raised while moving a job through the pipeline.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("submission rejected: {0}")]
    Rejected(#[from] RejectionReason),

    #[error("a verification for this submission is already in progress")]
    DuplicateInFlight,

    #[error("job {0} does not exist")]
    NotFound(Uuid),

    #[error("job {id} cannot be {action} while {status}")]
    InvalidStatus { id: Uuid, status: JobStatus, action: &'static str },

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<DatabaseError> for JobError {
    fn from(value: DatabaseError) -> Self {
        // The unique-key rejection is a first-class outcome, not a storage
        // failure
        match value {
            DatabaseError::DuplicateJob => JobError::DuplicateInFlight,
            other => JobError::Database(other),
        }
    }
}

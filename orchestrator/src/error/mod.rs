pub mod job;

use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::queue::QueueError;
use crate::core::client::role::RoleError;
use crate::core::client::verifier::VerifierError;
pub use job::JobError;

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Top-level error for process startup and the run loop. Request-scoped
/// failures stay inside [`JobError`] and the client errors; this type is
/// what `main` sees.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),

    #[error("Role client error: {0}")]
    RoleError(#[from] RoleError),

    #[error("Verifier error: {0}")]
    VerifierError(#[from] VerifierError),

    #[error("Job error: {0}")]
    JobError(#[from] JobError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Worker error: {0}")]
    WorkerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

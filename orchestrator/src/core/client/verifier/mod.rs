pub mod stub;

use async_trait::async_trait;

use crate::types::jobs::VerificationJob;
use crate::types::verdict::Verdict;

pub use stub::StubVerifier;

#[derive(thiserror::Error, Debug)]
pub enum VerifierError {
    #[error("verification worker failed: {0}")]
    WorkerFailed(String),

    #[error("verification worker is unavailable: {0}")]
    Unavailable(String),
}

/// The external worker contract: given a job, eventually produce exactly
/// one verdict for its `job_id`, or fail.
///
/// The pipeline depends only on this trait. The response is asynchronous
/// relative to the original submission; when the worker stays silent the
/// job expires rather than blocking anything. Swapping the stub for the
/// real scoring worker requires no pipeline change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HandleVerifier: Send + Sync {
    async fn verify(&self, job: &VerificationJob) -> Result<Verdict, VerifierError>;
}

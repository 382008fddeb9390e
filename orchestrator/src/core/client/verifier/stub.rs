use async_trait::async_trait;
use sha3::{Digest, Sha3_256};

use super::{HandleVerifier, VerifierError};
use crate::types::jobs::VerificationJob;
use crate::types::verdict::Verdict;

/// Tier roles granted by score band, highest first.
pub const TIER_ROLE_NAMES: [&str; 3] = ["Top Signal", "Signal Amplifier", "Signal Lite"];

/// Deterministic placeholder for the real scoring worker.
///
/// Derives a stable pseudo-score from the submitter id and link so repeated
/// runs and tests see consistent verdicts. Nothing outside this file may
/// assume anything about the derivation.
pub struct StubVerifier;

impl StubVerifier {
    fn score_for(job: &VerificationJob) -> f64 {
        let mut hasher = Sha3_256::new();
        hasher.update(job.discord_id.as_bytes());
        hasher.update(job.profile_link.as_bytes());
        let digest = hasher.finalize();
        let bucket = u64::from_be_bytes(digest[..8].try_into().unwrap_or_default()) % 10_000;
        bucket as f64 / 10_000.0
    }

    fn role_for(score: f64) -> Option<&'static str> {
        if score >= 0.9 {
            Some("Top Signal")
        } else if score >= 0.7 {
            Some("Signal Amplifier")
        } else if score >= 0.5 {
            Some("Signal Lite")
        } else {
            None
        }
    }
}

#[async_trait]
impl HandleVerifier for StubVerifier {
    async fn verify(&self, job: &VerificationJob) -> Result<Verdict, VerifierError> {
        let score = Self::score_for(job);
        let role_name = Self::role_for(score);
        Ok(Verdict {
            job_id: job.id,
            score,
            verified: role_name.is_some(),
            role_name: role_name.map(str::to_string),
        })
    }
}

use serde::{Deserialize, Serialize};

/// A raw submission as observed on the chat platform: the message text,
/// where it was posted, and how many images were attached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub discord_id: String,
    pub discord_username: String,
    pub channel_id: String,
    /// Message text, expected shape `@<handle> <url>`
    pub body: String,
    pub attachment_count: u32,
}

/// A submission that passed validation and is ready to become a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub discord_id: String,
    pub discord_username: String,
    /// Lowercased, no leading `@`
    pub claimed_handle: String,
    /// Normalized link: lowercased host, trailing slash stripped, query
    /// preserved
    pub profile_link: String,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::record::{HistoryEntry, VerificationRecord};

/// Standard envelope for API responses.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self { success: false, data: None, message: Some(message) }
    }
}

impl<T> ApiResponse<T> {
    pub fn success_with_data(data: T, message: Option<String>) -> Self {
        Self { success: true, data: Some(data), message }
    }
}

/// Query parameters of the metrics endpoint.
#[derive(Deserialize, Debug)]
pub struct MetricsQuery {
    pub discord_id: String,
}

/// Wire shape of the per-user metrics row. Timestamps travel as unix
/// seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricsResponse {
    pub discord_id: String,
    pub discord_username: String,
    pub x_username: String,
    pub verified: bool,
    pub last_verify_timestamp: i64,
    pub last_score: Option<f64>,
    pub role_assigned: Option<String>,
}

impl From<VerificationRecord> for MetricsResponse {
    fn from(record: VerificationRecord) -> Self {
        Self {
            discord_id: record.discord_id,
            discord_username: record.discord_username,
            x_username: record.x_username,
            verified: record.verified,
            last_verify_timestamp: record.last_verify_timestamp.timestamp(),
            last_score: record.last_score,
            role_assigned: record.role_assigned,
        }
    }
}

/// One row of the per-user audit trail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryResponse {
    pub claimed_handle: String,
    pub verified: bool,
    pub score: Option<f64>,
    pub role_assigned: Option<String>,
    pub timestamp: i64,
}

impl From<HistoryEntry> for HistoryResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            claimed_handle: entry.claimed_handle,
            verified: entry.verified,
            score: entry.score,
            role_assigned: entry.role_assigned,
            timestamp: entry.timestamp.timestamp(),
        }
    }
}

/// Path parameter carrying a job id.
#[derive(Deserialize)]
pub struct JobId {
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmissionAccepted {
    pub job_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JobStatusResponse {
    pub id: Uuid,
    pub status: String,
    pub claimed_handle: String,
    pub profile_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

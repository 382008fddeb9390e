use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable per-user verification state, one row per `discord_id`.
///
/// Upserts are keyed on `discord_id`; `last_verify_timestamp` never moves
/// backwards (the store enforces this in the upsert statement).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationRecord {
    pub discord_id: String,
    pub discord_username: String,
    /// Most recently claimed handle
    pub x_username: String,
    pub verified: bool,
    pub last_verify_timestamp: DateTime<Utc>,
    pub last_score: Option<f64>,
    pub role_assigned: Option<String>,
}

/// Append-only audit trail of verdict applications.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub discord_id: String,
    pub discord_username: String,
    pub claimed_handle: String,
    pub verified: bool,
    pub score: Option<f64>,
    pub role_assigned: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::types::jobs::{JobStatus, VerificationJob};
use crate::types::params::DatabaseParams;
use crate::types::record::{HistoryEntry, VerificationRecord};

pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    /// The partial unique index rejected the insert: an active job already
    /// holds this idempotency key.
    #[error("a job with this idempotency key is already in flight")]
    DuplicateJob,

    #[error("failed to connect to the database: {0}")]
    ConnectionFailed(String),

    #[error("stored value could not be decoded: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Trait defining persistence operations over jobs, records and history.
///
/// Two interchangeable implementations share this contract and one schema:
/// [`PostgresClient`] when a connection string is configured and
/// [`SqliteClient`] otherwise. Everything above this trait is
/// backend-agnostic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Creates the tables and indexes if absent. Safe to run on every
    /// startup; failure here is fatal to the process.
    async fn ensure_schema(&self) -> Result<(), DatabaseError>;

    /// Inserts a job, atomically enforcing the one-active-job-per-key
    /// invariant. Returns [`DatabaseError::DuplicateJob`] when an active job
    /// with the same idempotency key exists.
    async fn create_job(&self, job: &VerificationJob) -> Result<(), DatabaseError>;

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<VerificationJob>, DatabaseError>;

    async fn get_active_job_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<VerificationJob>, DatabaseError>;

    /// Transitions a job to `to` iff its current status is in
    /// `allowed_from`. Returns whether a row was updated; `false` means the
    /// job was missing or in a different status (e.g. a redelivered message
    /// racing a finished transition).
    async fn update_job_status(
        &self,
        id: Uuid,
        allowed_from: &[JobStatus],
        to: JobStatus,
        failure_reason: Option<String>,
    ) -> Result<bool, DatabaseError>;

    /// Jobs currently in any of the given statuses, oldest first.
    async fn list_jobs_by_status(&self, statuses: &[JobStatus]) -> Result<Vec<VerificationJob>, DatabaseError>;

    /// Expires every active job created before `cutoff` and returns their
    /// ids. Expiry releases the idempotency key.
    async fn expire_jobs_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, DatabaseError>;

    /// Single-statement upsert keyed on `discord_id`.
    /// `last_verify_timestamp` never moves backwards; `role_assigned` is
    /// only overwritten by a verified outcome.
    async fn upsert_record(&self, record: &VerificationRecord) -> Result<(), DatabaseError>;

    async fn get_record_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<VerificationRecord>, DatabaseError>;

    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), DatabaseError>;

    /// Most recent history entries for a user, newest first.
    async fn get_history_for_user(
        &self,
        discord_id: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, DatabaseError>;
}

/// Builds the backend selected by configuration and pings it once.
pub async fn build_database_client(params: &DatabaseParams) -> Result<Box<dyn DatabaseClient>, DatabaseError> {
    match params {
        DatabaseParams::Postgres { connection_string } => {
            Ok(Box::new(PostgresClient::connect(connection_string).await?))
        }
        DatabaseParams::Sqlite { path } => Ok(Box::new(SqliteClient::open(path).await?)),
    }
}

// Row mirrors shared by both backends. Ids and statuses travel as TEXT and
// timestamps as unix seconds so the same decode path serves Postgres and
// SQLite.

#[derive(sqlx::FromRow)]
pub(crate) struct JobRow {
    pub id: String,
    pub discord_id: String,
    pub discord_username: String,
    pub claimed_handle: String,
    pub profile_link: String,
    pub idempotency_key: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub failure_reason: Option<String>,
}

impl TryFrom<JobRow> for VerificationJob {
    type Error = DatabaseError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(VerificationJob {
            id: parse_uuid(&row.id)?,
            discord_id: row.discord_id,
            discord_username: row.discord_username,
            claimed_handle: row.claimed_handle,
            profile_link: row.profile_link,
            idempotency_key: row.idempotency_key,
            status: JobStatus::from_str(&row.status)
                .map_err(|_| DatabaseError::Corrupt(format!("unknown job status `{}`", row.status)))?,
            created_at: from_unix(row.created_at),
            updated_at: from_unix(row.updated_at),
            failure_reason: row.failure_reason,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub discord_id: String,
    pub discord_username: String,
    pub x_username: String,
    pub verified: bool,
    pub last_verify_timestamp: i64,
    pub last_score: Option<f64>,
    pub role_assigned: Option<String>,
}

impl From<RecordRow> for VerificationRecord {
    fn from(row: RecordRow) -> Self {
        VerificationRecord {
            discord_id: row.discord_id,
            discord_username: row.discord_username,
            x_username: row.x_username,
            verified: row.verified,
            last_verify_timestamp: from_unix(row.last_verify_timestamp),
            last_score: row.last_score,
            role_assigned: row.role_assigned,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct HistoryRow {
    pub discord_id: String,
    pub discord_username: String,
    pub claimed_handle: String,
    pub verified: bool,
    pub score: Option<f64>,
    pub role_assigned: Option<String>,
    pub timestamp: i64,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            discord_id: row.discord_id,
            discord_username: row.discord_username,
            claimed_handle: row.claimed_handle,
            verified: row.verified,
            score: row.score,
            role_assigned: row.role_assigned,
            timestamp: from_unix(row.timestamp),
        }
    }
}

/// Renders a status set as a SQL literal list. Statuses are a closed enum,
/// so inlining them keeps the bind numbering static across queries.
pub(crate) fn status_list_sql(statuses: &[JobStatus]) -> String {
    statuses.iter().map(|status| format!("'{status}'")).collect::<Vec<_>>().join(",")
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|_| DatabaseError::Corrupt(format!("invalid job id `{raw}`")))
}

pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

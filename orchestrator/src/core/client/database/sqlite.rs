use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{parse_uuid, status_list_sql, DatabaseClient, DatabaseError, HistoryRow, JobRow, RecordRow};
use crate::types::jobs::{JobStatus, VerificationJob};
use crate::types::record::{HistoryEntry, VerificationRecord};

const JOB_COLUMNS: &str = "id, discord_id, discord_username, claimed_handle, profile_link, \
     idempotency_key, status, created_at, updated_at, failure_reason";

/// Embedded file-backed fallback. Same schema and semantics as the
/// Postgres backend; writes serialize on SQLite's writer lock, which is
/// what gives same-key upserts their ordering.
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        info!(path = %path.display(), "Opened embedded SQLite backend");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let active = status_list_sql(&JobStatus::ACTIVE);
        let statements = [
            "CREATE TABLE IF NOT EXISTS verification_jobs (
                id TEXT PRIMARY KEY,
                discord_id TEXT NOT NULL,
                discord_username TEXT NOT NULL,
                claimed_handle TEXT NOT NULL,
                profile_link TEXT NOT NULL,
                idempotency_key TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                failure_reason TEXT
            )"
            .to_string(),
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_verification_jobs_active_key \
                 ON verification_jobs (idempotency_key) WHERE status IN ({active})"
            ),
            "CREATE INDEX IF NOT EXISTS idx_verification_jobs_status_created \
             ON verification_jobs (status, created_at)"
                .to_string(),
            "CREATE TABLE IF NOT EXISTS verification_records (
                discord_id TEXT PRIMARY KEY,
                discord_username TEXT NOT NULL,
                x_username TEXT NOT NULL,
                verified BOOLEAN NOT NULL,
                last_verify_timestamp INTEGER NOT NULL,
                last_score REAL,
                role_assigned TEXT
            )"
            .to_string(),
            "CREATE TABLE IF NOT EXISTS verification_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                discord_id TEXT NOT NULL,
                discord_username TEXT NOT NULL,
                claimed_handle TEXT NOT NULL,
                verified BOOLEAN NOT NULL,
                score REAL,
                role_assigned TEXT,
                timestamp INTEGER NOT NULL
            )"
            .to_string(),
            "CREATE INDEX IF NOT EXISTS idx_verification_history_user_ts \
             ON verification_history (discord_id, timestamp DESC)"
                .to_string(),
        ];
        for statement in statements {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!("SQLite schema ensured");
        Ok(())
    }

    async fn create_job(&self, job: &VerificationJob) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO verification_jobs (id, discord_id, discord_username, claimed_handle, \
             profile_link, idempotency_key, status, created_at, updated_at, failure_reason) \
             VALUES (?,?,?,?,?,?,?,?,?,?) ON CONFLICT DO NOTHING",
        )
        .bind(job.id.to_string())
        .bind(&job.discord_id)
        .bind(&job.discord_username)
        .bind(&job.claimed_handle)
        .bind(&job.profile_link)
        .bind(&job.idempotency_key)
        .bind(job.status.to_string())
        .bind(job.created_at.timestamp())
        .bind(job.updated_at.timestamp())
        .bind(&job.failure_reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::DuplicateJob);
        }
        Ok(())
    }

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<VerificationJob>, DatabaseError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM verification_jobs WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(VerificationJob::try_from).transpose()
    }

    async fn get_active_job_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<VerificationJob>, DatabaseError> {
        let active = status_list_sql(&JobStatus::ACTIVE);
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM verification_jobs \
             WHERE idempotency_key = ? AND status IN ({active}) LIMIT 1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(VerificationJob::try_from).transpose()
    }

    async fn update_job_status(
        &self,
        id: Uuid,
        allowed_from: &[JobStatus],
        to: JobStatus,
        failure_reason: Option<String>,
    ) -> Result<bool, DatabaseError> {
        let allowed = status_list_sql(allowed_from);
        let result = sqlx::query(&format!(
            "UPDATE verification_jobs \
             SET status = ?, updated_at = ?, failure_reason = COALESCE(?, failure_reason) \
             WHERE id = ? AND status IN ({allowed})"
        ))
        .bind(to.to_string())
        .bind(Utc::now().timestamp())
        .bind(failure_reason)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_jobs_by_status(&self, statuses: &[JobStatus]) -> Result<Vec<VerificationJob>, DatabaseError> {
        let wanted = status_list_sql(statuses);
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM verification_jobs \
             WHERE status IN ({wanted}) ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(VerificationJob::try_from).collect()
    }

    async fn expire_jobs_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, DatabaseError> {
        let active = status_list_sql(&JobStatus::ACTIVE);
        let ids = sqlx::query_scalar::<_, String>(&format!(
            "UPDATE verification_jobs \
             SET status = '{}', updated_at = ?, failure_reason = ? \
             WHERE status IN ({active}) AND created_at < ? RETURNING id",
            JobStatus::Expired
        ))
        .bind(Utc::now().timestamp())
        .bind("job expired before a verdict was applied")
        .bind(cutoff.timestamp())
        .fetch_all(&self.pool)
        .await?;
        ids.iter().map(|raw| parse_uuid(raw)).collect()
    }

    async fn upsert_record(&self, record: &VerificationRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO verification_records (discord_id, discord_username, x_username, verified, \
             last_verify_timestamp, last_score, role_assigned) \
             VALUES (?,?,?,?,?,?,?) \
             ON CONFLICT (discord_id) DO UPDATE SET \
                discord_username = excluded.discord_username, \
                x_username = excluded.x_username, \
                verified = excluded.verified, \
                last_verify_timestamp = MAX(verification_records.last_verify_timestamp, excluded.last_verify_timestamp), \
                last_score = excluded.last_score, \
                role_assigned = CASE WHEN excluded.verified THEN excluded.role_assigned \
                                     ELSE verification_records.role_assigned END",
        )
        .bind(&record.discord_id)
        .bind(&record.discord_username)
        .bind(&record.x_username)
        .bind(record.verified)
        .bind(record.last_verify_timestamp.timestamp())
        .bind(record.last_score)
        .bind(&record.role_assigned)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_record_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<VerificationRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT discord_id, discord_username, x_username, verified, last_verify_timestamp, \
             last_score, role_assigned FROM verification_records WHERE discord_id = ?",
        )
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(VerificationRecord::from))
    }

    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO verification_history (discord_id, discord_username, claimed_handle, \
             verified, score, role_assigned, timestamp) VALUES (?,?,?,?,?,?,?)",
        )
        .bind(&entry.discord_id)
        .bind(&entry.discord_username)
        .bind(&entry.claimed_handle)
        .bind(entry.verified)
        .bind(entry.score)
        .bind(&entry.role_assigned)
        .bind(entry.timestamp.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_history_for_user(
        &self,
        discord_id: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT discord_id, discord_username, claimed_handle, verified, score, role_assigned, \
             timestamp FROM verification_history WHERE discord_id = ? \
             ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(discord_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{parse_uuid, status_list_sql, DatabaseClient, DatabaseError, HistoryRow, JobRow, RecordRow};
use crate::types::jobs::{JobStatus, VerificationJob};
use crate::types::record::{HistoryEntry, VerificationRecord};

const JOB_COLUMNS: &str = "id, discord_id, discord_username, claimed_handle, profile_link, \
     idempotency_key, status, created_at, updated_at, failure_reason";

/// Server-based relational backend.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn connect(connection_string: &str) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        info!("Connected to Postgres backend");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
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
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
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
                last_verify_timestamp BIGINT NOT NULL,
                last_score DOUBLE PRECISION,
                role_assigned TEXT
            )"
            .to_string(),
            "CREATE TABLE IF NOT EXISTS verification_history (
                id BIGSERIAL PRIMARY KEY,
                discord_id TEXT NOT NULL,
                discord_username TEXT NOT NULL,
                claimed_handle TEXT NOT NULL,
                verified BOOLEAN NOT NULL,
                score DOUBLE PRECISION,
                role_assigned TEXT,
                timestamp BIGINT NOT NULL
            )"
            .to_string(),
            "CREATE INDEX IF NOT EXISTS idx_verification_history_user_ts \
             ON verification_history (discord_id, timestamp DESC)"
                .to_string(),
        ];
        for statement in statements {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!("Postgres schema ensured");
        Ok(())
    }

    async fn create_job(&self, job: &VerificationJob) -> Result<(), DatabaseError> {
        // ON CONFLICT DO NOTHING also arbitrates on the partial unique
        // index; zero rows affected means another job holds the key.
        let result = sqlx::query(
            "INSERT INTO verification_jobs (id, discord_id, discord_username, claimed_handle, \
             profile_link, idempotency_key, status, created_at, updated_at, failure_reason) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10) ON CONFLICT DO NOTHING",
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
            "SELECT {JOB_COLUMNS} FROM verification_jobs WHERE id = $1"
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
             WHERE idempotency_key = $1 AND status IN ({active}) LIMIT 1"
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
             SET status = $2, updated_at = $3, failure_reason = COALESCE($4, failure_reason) \
             WHERE id = $1 AND status IN ({allowed})"
        ))
        .bind(id.to_string())
        .bind(to.to_string())
        .bind(Utc::now().timestamp())
        .bind(failure_reason)
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
             SET status = '{}', updated_at = $1, failure_reason = $2 \
             WHERE status IN ({active}) AND created_at < $3 RETURNING id",
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
             VALUES ($1,$2,$3,$4,$5,$6,$7) \
             ON CONFLICT (discord_id) DO UPDATE SET \
                discord_username = EXCLUDED.discord_username, \
                x_username = EXCLUDED.x_username, \
                verified = EXCLUDED.verified, \
                last_verify_timestamp = GREATEST(verification_records.last_verify_timestamp, EXCLUDED.last_verify_timestamp), \
                last_score = EXCLUDED.last_score, \
                role_assigned = CASE WHEN EXCLUDED.verified THEN EXCLUDED.role_assigned \
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
             last_score, role_assigned FROM verification_records WHERE discord_id = $1",
        )
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(VerificationRecord::from))
    }

    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO verification_history (discord_id, discord_username, claimed_handle, \
             verified, score, role_assigned, timestamp) VALUES ($1,$2,$3,$4,$5,$6,$7)",
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
             timestamp FROM verification_history WHERE discord_id = $1 \
             ORDER BY timestamp DESC LIMIT $2",
        )
        .bind(discord_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::database::DatabaseCliArgs;
use crate::cli::discord::DiscordCliArgs;
use crate::cli::queue::QueueCliArgs;
use crate::cli::server::ServerCliArgs;
use crate::cli::service::ServiceCliArgs;
use crate::cli::validation::ValidationCliArgs;

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

impl From<ServerCliArgs> for ServerParams {
    fn from(value: ServerCliArgs) -> Self {
        Self { host: value.host, port: value.port }
    }
}

/// Which persistence backend to run against, decided once at startup.
#[derive(Debug, Clone)]
pub enum DatabaseParams {
    /// Server-based relational backend
    Postgres { connection_string: String },
    /// Embedded file-backed fallback
    Sqlite { path: PathBuf },
}

impl From<DatabaseCliArgs> for DatabaseParams {
    fn from(value: DatabaseCliArgs) -> Self {
        match value.database_url.filter(|url| !url.trim().is_empty()) {
            Some(connection_string) => DatabaseParams::Postgres { connection_string },
            None => DatabaseParams::Sqlite { path: value.sqlite_path },
        }
    }
}

/// Which queue transport carries jobs and verdicts.
#[derive(Debug, Clone)]
pub enum QueueParams {
    /// SQS queues named `<prefix>_<queue_type>`
    Sqs { queue_prefix: String },
    /// Process-local transport; durability comes from the job table
    InMemory,
}

impl From<QueueCliArgs> for QueueParams {
    fn from(value: QueueCliArgs) -> Self {
        match value.sqs_queue_prefix.filter(|prefix| !prefix.trim().is_empty()) {
            Some(queue_prefix) => QueueParams::Sqs { queue_prefix },
            None => QueueParams::InMemory,
        }
    }
}

/// Credentials and target guild for the role-grant capability. `None` when
/// the process runs without Discord access (role grants then fail loudly).
#[derive(Debug, Clone)]
pub struct DiscordParams {
    pub bot_token: Option<String>,
    pub guild_id: Option<String>,
    pub api_base: String,
}

impl From<DiscordCliArgs> for DiscordParams {
    fn from(value: DiscordCliArgs) -> Self {
        Self { bot_token: value.bot_token, guild_id: value.guild_id, api_base: value.api_base }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationParams {
    /// Submissions must originate from this channel; `None` accepts any
    pub verify_channel_id: Option<String>,
    /// Hosts accepted as profile links
    pub accepted_hosts: Vec<String>,
}

impl From<ValidationCliArgs> for ValidationParams {
    fn from(value: ValidationCliArgs) -> Self {
        Self {
            verify_channel_id: value.verify_channel_id.filter(|id| !id.trim().is_empty()),
            accepted_hosts: value.accepted_hosts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceParams {
    /// How long a job may stay unresolved before it is expired
    pub job_ttl: Duration,
    /// Cadence of the expiry sweeper
    pub expiry_sweep_interval: Duration,
    /// Sleep between empty polls of a queue
    pub poll_interval: Duration,
}

impl From<ServiceCliArgs> for ServiceParams {
    fn from(value: ServiceCliArgs) -> Self {
        Self {
            job_ttl: Duration::from_secs(value.job_ttl_seconds),
            expiry_sweep_interval: Duration::from_secs(value.expiry_sweep_interval_seconds),
            poll_interval: Duration::from_millis(value.poll_interval_ms),
        }
    }
}

use clap::Args;
use std::path::PathBuf;

/// Parameters used to select and config the persistence backend.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct DatabaseCliArgs {
    /// Postgres connection string. When set and non-empty the relational
    /// backend is used; otherwise the embedded SQLite backend is used.
    #[arg(env = "XVERIFY_DATABASE_URL", long)]
    pub database_url: Option<String>,

    /// Path of the embedded SQLite database file.
    #[arg(env = "XVERIFY_SQLITE_PATH", long, default_value = "xverify.db")]
    pub sqlite_path: PathBuf,
}

use clap::Args;

/// Parameters used to config job lifecycle timing.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ServiceCliArgs {
    /// Seconds an unresolved job may live before it is expired.
    #[arg(env = "XVERIFY_JOB_TTL_SECONDS", long, default_value = "86400")]
    pub job_ttl_seconds: u64,

    /// Seconds between expiry sweeps.
    #[arg(env = "XVERIFY_EXPIRY_SWEEP_INTERVAL_SECONDS", long, default_value = "60")]
    pub expiry_sweep_interval_seconds: u64,

    /// Milliseconds to sleep when a queue poll returns no message.
    #[arg(env = "XVERIFY_POLL_INTERVAL_MS", long, default_value = "1000")]
    pub poll_interval_ms: u64,
}

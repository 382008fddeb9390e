use clap::Args;

/// Parameters used to config submission validation.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ValidationCliArgs {
    /// Channel submissions must be posted in. Empty or unset accepts
    /// submissions from any channel.
    #[arg(env = "XVERIFY_VERIFY_CHANNEL_ID", long)]
    pub verify_channel_id: Option<String>,

    /// Hosts accepted in profile links.
    #[arg(
        env = "XVERIFY_ACCEPTED_HOSTS",
        long,
        value_delimiter = ',',
        default_values_t = vec!["x.com".to_string(), "twitter.com".to_string()]
    )]
    pub accepted_hosts: Vec<String>,
}

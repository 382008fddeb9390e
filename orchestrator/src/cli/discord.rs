use clap::Args;

/// Parameters used to config the Discord role-grant client.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct DiscordCliArgs {
    /// Bot token used for role grants. When missing, role grants fail and
    /// are surfaced as such; the rest of the pipeline still runs.
    #[arg(env = "XVERIFY_DISCORD_BOT_TOKEN", long)]
    pub bot_token: Option<String>,

    /// Guild whose roles are granted.
    #[arg(env = "XVERIFY_DISCORD_GUILD_ID", long)]
    pub guild_id: Option<String>,

    /// Discord REST API base URL.
    #[arg(env = "XVERIFY_DISCORD_API_BASE", long, default_value = "https://discord.com/api/v10")]
    pub api_base: String,
}

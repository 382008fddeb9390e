use clap::Args;

/// Parameters used to config the HTTP server.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ServerCliArgs {
    /// The host to listen on.
    #[arg(env = "XVERIFY_HOST", long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[arg(env = "XVERIFY_PORT", long, default_value = "3000")]
    pub port: u16,
}

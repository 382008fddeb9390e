use clap::{Parser, Subcommand};

pub mod database;
pub mod discord;
pub mod queue;
pub mod server;
pub mod service;
pub mod validation;

#[derive(Parser, Debug)]
#[command(
    name = "xverify-orchestrator",
    about = "xverify Orchestrator - X handle ownership verification pipeline",
    long_about = "The orchestrator accepts handle-ownership submissions, queues verification \
    jobs, applies worker verdicts, grants tier roles, and serves per-user verification metrics.\n\n\
    Quick Start:\n  \
    xverify-orchestrator run"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the orchestrator service
    #[command(long_about = "Start the HTTP surface and the worker pool.\n\n\
        The persistence backend is selected by XVERIFY_DATABASE_URL (Postgres when set,\n\
        embedded SQLite otherwise); the queue transport by XVERIFY_SQS_QUEUE_PREFIX\n\
        (SQS when set, in-process otherwise).")]
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    #[clap(flatten, next_help_heading = None)]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten, next_help_heading = None)]
    pub database_args: database::DatabaseCliArgs,

    #[clap(flatten, next_help_heading = None)]
    pub queue_args: queue::QueueCliArgs,

    #[clap(flatten, next_help_heading = None)]
    pub discord_args: discord::DiscordCliArgs,

    #[clap(flatten, next_help_heading = None)]
    pub validation_args: validation::ValidationCliArgs,

    #[clap(flatten, next_help_heading = None)]
    pub service_args: service::ServiceCliArgs,
}

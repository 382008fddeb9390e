use clap::Parser as _;
use dotenvy::dotenv;
use tracing::{debug, error, info};
use xverify_orchestrator::cli::{Cli, Commands, RunCmd};
use xverify_orchestrator::core::config::Config;
use xverify_orchestrator::server::setup_server;
use xverify_orchestrator::utils::logging::init_logging;
use xverify_orchestrator::worker::initialize_worker;
use xverify_orchestrator::OrchestratorResult;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    info!("Starting xverify orchestrator");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { run_command } => {
            if let Err(e) = run_orchestrator(run_command).await {
                error!(
                    error = %e,
                    error_chain = ?e,
                    "Failed to run orchestrator service"
                );
                panic!("Failed to run orchestrator service: {}", e);
            }
            info!("Orchestrator service shut down cleanly");
        }
    }
}

async fn run_orchestrator(run_cmd: &RunCmd) -> OrchestratorResult<()> {
    let config = Config::from_run_cmd(run_cmd).await?;
    debug!("Configuration initialized");

    let (_address, server_handle) = setup_server(config.clone()).await?;

    let worker_controller = initialize_worker(config).await?;

    tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
    info!("Shutdown signal received");

    worker_controller.shutdown().await?;
    server_handle
        .shutdown()
        .await
        .map_err(|e| xverify_orchestrator::OrchestratorError::WorkerError(format!("server task failed: {e}")))?;
    Ok(())
}

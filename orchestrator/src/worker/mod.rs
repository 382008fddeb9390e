pub mod controller;
pub mod event_handler;

use std::sync::Arc;
use tracing::error;

use crate::core::config::Config;
use crate::error::OrchestratorResult;
use crate::worker::controller::WorkerController;
use crate::worker::event_handler::service::JobHandlerService;

/// Recovers unsettled jobs from the store, then starts the consumer loops
/// and the expiry sweeper in the background. The returned controller is the
/// shutdown handle.
pub async fn initialize_worker(config: Arc<Config>) -> OrchestratorResult<WorkerController> {
    JobHandlerService::requeue_unsettled_jobs(config.clone()).await?;

    let controller = WorkerController::new(config);
    let runner = controller.clone();
    let handle = tokio::spawn(async move {
        if let Err(e) = runner.run().await {
            error!(error = %e, "Worker controller stopped with an error");
        }
    });
    controller.register_run_handle(handle).await;
    Ok(controller)
}

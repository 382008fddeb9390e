use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::Config;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::types::queue::QueueType;
use crate::worker::controller::{EventWorker, ExpiryWorker};

/// Owns the worker tasks: one [`EventWorker`] per queue plus the expiry
/// sweeper, all on one cancellation tree for coordinated shutdown.
#[derive(Clone)]
pub struct WorkerController {
    config: Arc<Config>,
    cancellation_token: CancellationToken,
    run_handle: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl WorkerController {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            cancellation_token: CancellationToken::new(),
            run_handle: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Spawns every worker and waits for all of them to finish, which
    /// normally only happens after [`shutdown`](Self::shutdown).
    pub async fn run(&self) -> OrchestratorResult<()> {
        let mut workers = JoinSet::new();

        for queue_type in QueueType::iter() {
            let worker =
                EventWorker::new(queue_type, self.config.clone(), self.cancellation_token.child_token());
            workers.spawn(async move { worker.run().await });
        }

        let sweeper = ExpiryWorker::new(self.config.clone(), self.cancellation_token.child_token());
        workers.spawn(async move { sweeper.run().await });

        while let Some(result) = workers.join_next().await {
            result.map_err(|e| OrchestratorError::WorkerError(format!("worker task panicked: {e}")))?;
        }
        Ok(())
    }

    /// Signals every worker to stop and waits for the run task, when one
    /// was registered via [`initialize_worker`](crate::worker::initialize_worker).
    pub async fn shutdown(&self) -> OrchestratorResult<()> {
        info!("Shutting down workers");
        self.cancellation_token.cancel();
        if let Some(handle) = self.run_handle.lock().await.take() {
            handle
                .await
                .map_err(|e| OrchestratorError::WorkerError(format!("worker task failed to join: {e}")))?;
        }
        Ok(())
    }

    pub async fn register_run_handle(&self, handle: JoinHandle<()>) {
        *self.run_handle.lock().await = Some(handle);
    }
}

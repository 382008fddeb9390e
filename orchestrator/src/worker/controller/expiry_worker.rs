use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::config::Config;
use crate::worker::event_handler::service::JobHandlerService;

/// Periodic sweep that expires jobs unresolved past their TTL. Expiry is
/// the pipeline's only cancellation mechanism; everything else waits.
pub struct ExpiryWorker {
    config: Arc<Config>,
    cancellation_token: CancellationToken,
}

impl ExpiryWorker {
    pub fn new(config: Arc<Config>, cancellation_token: CancellationToken) -> Self {
        Self { config, cancellation_token }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.service_params().expiry_sweep_interval);
        info!("Starting expiry sweeper");

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    break;
                }

                _ = interval.tick() => {
                    if let Err(e) = JobHandlerService::expire_overdue_jobs(self.config.clone()).await {
                        error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }
        info!("Expiry sweeper stopped");
    }
}

use omniqueue::Delivery;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::core::config::Config;
use crate::error::JobError;
use crate::types::queue::{JobQueueMessage, QueueType};
use crate::types::verdict::Verdict;
use crate::worker::event_handler::service::JobHandlerService;

/// One consumer loop over one queue: receives, dispatches to the handler
/// service, then acks or nacks.
#[derive(Clone)]
pub struct EventWorker {
    config: Arc<Config>,
    queue_type: QueueType,
    cancellation_token: CancellationToken,
}

impl EventWorker {
    pub fn new(queue_type: QueueType, config: Arc<Config>, cancellation_token: CancellationToken) -> Self {
        Self { config, queue_type, cancellation_token }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Receives the next message, mapping an empty queue to `None` so the
    /// run loop can sleep instead of treating it as a failure.
    async fn get_message(&self) -> Result<Option<Delivery>, JobError> {
        match self.config.queue().consume_message_from_queue(self.queue_type).await {
            Ok(delivery) => Ok(Some(delivery)),
            Err(e) if e.is_no_data() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn parse_payload<T: serde::de::DeserializeOwned>(&self, message: &Delivery) -> Result<T, JobError> {
        message
            .payload_serde_json::<T>()
            .ok()
            .flatten()
            .ok_or_else(|| JobError::Other(format!("undecodable payload on queue {}", self.queue_type)))
    }

    async fn handle_message(&self, message: &Delivery) -> Result<(), JobError> {
        match self.queue_type {
            QueueType::JobProcessing => {
                let queue_message: JobQueueMessage = self.parse_payload(message)?;
                let span = tracing::info_span!(
                    "job_processing",
                    job_id = %queue_message.id,
                    queue = %self.queue_type,
                    correlation_id = %Uuid::new_v4(),
                );
                JobHandlerService::process_job(queue_message.id, self.config.clone()).instrument(span).await
            }
            QueueType::VerdictApplication => {
                let verdict: Verdict = self.parse_payload(message)?;
                let span = tracing::info_span!(
                    "verdict_application",
                    job_id = %verdict.job_id,
                    queue = %self.queue_type,
                    correlation_id = %Uuid::new_v4(),
                );
                JobHandlerService::apply_verdict(&verdict, self.config.clone()).instrument(span).await.map(|_| ())
            }
        }
    }

    /// Acks handled and poison messages; nacks only transient failures so
    /// the transport redelivers them.
    async fn post_processing(&self, result: Result<(), JobError>, message: Delivery) -> Result<(), JobError> {
        if let Err(ref error) = result {
            error!(queue = %self.queue_type, error = %error, "Failed to handle message");
            let transient = matches!(error, JobError::Database(_) | JobError::Queue(_));
            if transient {
                message.nack().await.map_err(|e| JobError::Other(e.0.to_string()))?;
                return result;
            }
        }
        message.ack().await.map_err(|e| JobError::Other(e.0.to_string()))?;
        result
    }

    async fn process_message(&self, message: Delivery) -> Result<(), JobError> {
        let result = self.handle_message(&message).await;
        self.post_processing(result, message).await
    }

    pub async fn run(&self) {
        info!("Starting {} worker", self.queue_type);
        let poll_interval = self.config.service_params().poll_interval;

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    break;
                }

                message = self.get_message() => {
                    match message {
                        Ok(Some(delivery)) => {
                            if let Err(e) = self.process_message(delivery).await {
                                warn!(queue = %self.queue_type, error = %e, "Message processing failed");
                            }
                        }
                        Ok(None) => {
                            tokio::time::sleep(poll_interval).await;
                        }
                        Err(e) => {
                            error!(queue = %self.queue_type, error = %e, "Failed to consume from queue");
                            tokio::time::sleep(poll_interval).await;
                        }
                    }
                }
            }
        }
        info!("{} worker stopped", self.queue_type);
    }
}

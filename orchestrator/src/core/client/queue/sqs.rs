use async_trait::async_trait;
use aws_sdk_sqs::Client;
use omniqueue::backends::{SqsBackend, SqsConfig};
use omniqueue::{Delivery, QueueConsumer};

use super::{QueueClient, QueueError};
use crate::types::queue::QueueType;

/// SQS-backed transport. Queues are provisioned out of band and named
/// `<prefix>_<queue_type>`.
pub struct SqsQueue {
    client: Client,
    queue_prefix: String,
}

impl SqsQueue {
    pub async fn new(queue_prefix: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&aws_config);
        Self { client, queue_prefix }
    }

    fn queue_name(&self, queue: QueueType) -> String {
        format!("{}_{}", self.queue_prefix, queue)
    }

    /// Resolves the queue URL from its name through the SQS API.
    async fn queue_url(&self, queue: QueueType) -> Result<String, QueueError> {
        let queue_name = self.queue_name(queue);
        Ok(self
            .client
            .get_queue_url()
            .queue_name(&queue_name)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(e.to_string()))?
            .queue_url()
            .ok_or_else(|| QueueError::FailedToGetQueueUrl(queue_name))?
            .to_string())
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn send_message(&self, queue: QueueType, payload: String) -> Result<(), QueueError> {
        let queue_url = self.queue_url(queue).await?;
        self.client
            .send_message()
            .queue_url(&queue_url)
            .message_body(&payload)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(e.to_string()))?;
        tracing::debug!(queue = %queue, "Sent message to queue");
        Ok(())
    }

    async fn consume_message_from_queue(&self, queue: QueueType) -> Result<Delivery, QueueError> {
        let queue_url = self.queue_url(queue).await?;
        let mut consumer = SqsBackend::builder(SqsConfig { queue_dsn: queue_url, override_endpoint: false })
            .build_consumer()
            .await?;
        Ok(consumer.receive().await?)
    }
}

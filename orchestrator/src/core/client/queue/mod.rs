pub mod memory;
pub mod sqs;

use async_trait::async_trait;
use omniqueue::Delivery;

use crate::types::params::QueueParams;
use crate::types::queue::QueueType;

pub use memory::InMemoryQueue;
pub use sqs::SqsQueue;

#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("failed to resolve url for queue {0}")]
    FailedToGetQueueUrl(String),

    #[error("no transport configured for queue {0}")]
    UnknownQueue(String),

    #[error("failed to serialize queue payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] omniqueue::QueueError),

    #[error("sqs error: {0}")]
    Sqs(String),
}

impl QueueError {
    /// True when the receive simply found an empty queue, which the worker
    /// loop treats as "sleep and poll again" rather than a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, QueueError::Transport(omniqueue::QueueError::NoData))
    }
}

/// Trait defining the ordered hand-off between pipeline stages.
///
/// Delivery is at-least-once: consumers ack after handling, and anything
/// downstream of a queue must tolerate redelivery.
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn send_message(&self, queue: QueueType, payload: String) -> Result<(), QueueError>;

    /// Receives the next message. Returns a `NoData` transport error when
    /// the queue is empty (see [`QueueError::is_no_data`]).
    async fn consume_message_from_queue(&self, queue: QueueType) -> Result<Delivery, QueueError>;
}

/// Builds the transport selected by configuration.
pub async fn build_queue_client(params: &QueueParams) -> Result<Box<dyn QueueClient>, QueueError> {
    match params {
        QueueParams::Sqs { queue_prefix } => Ok(Box::new(SqsQueue::new(queue_prefix.clone()).await)),
        QueueParams::InMemory => Ok(Box::new(InMemoryQueue::new().await?)),
    }
}

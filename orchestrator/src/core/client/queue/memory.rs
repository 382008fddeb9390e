use async_trait::async_trait;
use omniqueue::backends::InMemoryBackend;
use omniqueue::{Delivery, DynConsumer, DynProducer, QueueConsumer, QueueProducer};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;

use super::{QueueClient, QueueError};
use crate::types::queue::QueueType;

struct Channel {
    producer: DynProducer,
    consumer: Mutex<DynConsumer>,
}

/// Process-local transport used when no SQS prefix is configured.
///
/// Messages do not survive a restart; the job table does, and active jobs
/// are re-enqueued at startup, so the durability guarantee holds.
pub struct InMemoryQueue {
    channels: HashMap<QueueType, Channel>,
}

impl InMemoryQueue {
    pub async fn new() -> Result<Self, QueueError> {
        let mut channels = HashMap::new();
        for queue in QueueType::iter() {
            let (producer, consumer) = InMemoryBackend::builder().make_dynamic().build_pair().await?;
            channels.insert(queue, Channel { producer, consumer: Mutex::new(consumer) });
        }
        Ok(Self { channels })
    }

    fn channel(&self, queue: QueueType) -> Result<&Channel, QueueError> {
        self.channels.get(&queue).ok_or_else(|| QueueError::UnknownQueue(queue.to_string()))
    }
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn send_message(&self, queue: QueueType, payload: String) -> Result<(), QueueError> {
        self.channel(queue)?.producer.send_raw(payload.as_bytes()).await?;
        Ok(())
    }

    async fn consume_message_from_queue(&self, queue: QueueType) -> Result<Delivery, QueueError> {
        let mut consumer = self.channel(queue)?.consumer.lock().await;
        Ok(consumer.receive().await?)
    }
}

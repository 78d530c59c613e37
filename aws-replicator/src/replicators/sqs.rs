use crate::backend::{BackendLocator, LocalMessage};
use crate::config::EnumerationConfig;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteClientFactory;
use crate::replicator_core::{Enumerator, Injector, ResourceDescriptor, ResourceKind};
use crate::types::QueueMessage;
use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::{debug, info, warn};

pub const MESSAGES_FIELD: &str = "Messages";

/// Drains a remote queue and appends its messages to the local one.
pub struct SqsQueueReplicator;

impl SqsQueueReplicator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqsQueueReplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enumerator for SqsQueueReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Queue
    }

    async fn enumerate(
        &self,
        queue_name: &str,
        remote: &dyn RemoteClientFactory,
        config: &EnumerationConfig,
    ) -> Result<ResourceDescriptor> {
        let source = remote.queues();
        let queue_url = source.queue_url(queue_name).await?;

        // Receiving hides messages for the visibility timeout, so the drain is
        // best effort: in-flight messages are missed, redeliveries duplicate.
        let mut messages: Vec<QueueMessage> = Vec::new();
        let mut polls = 0;
        loop {
            if polls >= config.max_receive_polls {
                warn!(
                    queue = queue_name,
                    polls,
                    received = messages.len(),
                    "receive budget exhausted, replicating partial backlog"
                );
                break;
            }
            polls += 1;
            let batch = source.receive(&queue_url, config.queue_wait_time_secs).await?;
            if batch.is_empty() {
                break;
            }
            debug!(queue = queue_name, batch = batch.len(), "received messages");
            messages.extend(batch);
        }
        info!(queue = queue_name, messages = messages.len(), polls, "enumerated queue");

        let mut props = Map::new();
        props.insert(ResourceKind::Queue.name_property().into(), json!(queue_name));
        props.insert(MESSAGES_FIELD.into(), json!(messages));
        Ok(ResourceDescriptor::new(ResourceKind::Queue, queue_url, props))
    }
}

#[async_trait]
impl Injector for SqsQueueReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Queue
    }

    async fn inject(&self, descriptor: &ResourceDescriptor, backends: &dyn BackendLocator) -> Result<()> {
        let queue_name = descriptor.resource_name(ResourceKind::Queue);
        let messages: Vec<QueueMessage> = descriptor.payload(MESSAGES_FIELD)?;
        let queue = backends
            .find_queue(&queue_name)
            .await
            .ok_or_else(|| ReplicationError::target_missing(ResourceKind::Queue.label(&queue_name)))?;

        info!(queue = %queue_name, messages = messages.len(), "inserting messages into queue");
        for message in messages {
            queue.put(LocalMessage::from_remote(message)).await?;
        }
        Ok(())
    }
}

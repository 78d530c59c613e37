use super::QueueSource;
use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceKind;
use crate::types::{MessageAttribute, QueueMessage};
use async_trait::async_trait;
use aws_sdk_sqs as sqs;
use sqs::error::DisplayErrorContext;
use sqs::types::{Message, MessageSystemAttributeName};

// Provider maximum per receive call.
const MAX_MESSAGES_PER_RECEIVE: i32 = 10;

pub struct AwsQueueSource {
    client: sqs::Client,
}

impl AwsQueueSource {
    pub fn new(client: sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueSource for AwsQueueSource {
    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        let label = ResourceKind::Queue.label(queue_name);
        let out = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_queue_does_not_exist()) {
                    ReplicationError::not_found(label.clone())
                } else {
                    ReplicationError::remote(label.clone(), DisplayErrorContext(&e).to_string())
                }
            })?;
        out.queue_url()
            .map(str::to_string)
            .ok_or_else(|| ReplicationError::not_found(label))
    }

    async fn receive(&self, queue_url: &str, wait_time_secs: i32) -> Result<Vec<QueueMessage>> {
        let out = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .wait_time_seconds(wait_time_secs)
            .max_number_of_messages(MAX_MESSAGES_PER_RECEIVE)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| {
                ReplicationError::remote(
                    ResourceKind::Queue.label(queue_url),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;
        Ok(out.messages().iter().map(to_queue_message).collect())
    }
}

fn to_queue_message(m: &Message) -> QueueMessage {
    let attributes = m
        .attributes()
        .map(|a| {
            a.iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    let message_attributes = m
        .message_attributes()
        .map(|a| {
            a.iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        MessageAttribute {
                            data_type: v.data_type().to_string(),
                            string_value: v.string_value().map(str::to_string),
                            binary_value: v.binary_value().map(|b| b.as_ref().to_vec()),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    QueueMessage {
        message_id: m.message_id().map(str::to_string),
        receipt_handle: m.receipt_handle().map(str::to_string),
        md5_of_body: m.md5_of_body().map(str::to_string),
        body: m.body().unwrap_or_default().to_string(),
        attributes,
        md5_of_message_attributes: m.md5_of_message_attributes().map(str::to_string),
        message_attributes,
    }
}

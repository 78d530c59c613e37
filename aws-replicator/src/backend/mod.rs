//! Handles into the local instance's live stores.
//!
//! Injectors never own a backend; they get a [`BackendLocator`] per call and
//! mutate through the handles it returns.

mod memory;

pub use memory::{EmulatorBackends, MemoryBucket, MemoryQueue, MemoryTable};

use crate::error::Result;
use crate::types::{Item, MessageAttribute, QueueMessage};
use async_trait::async_trait;
use md5::{Digest, Md5};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A message as the local queue stores it. Integrity fields the remote may
/// omit are filled in by [`LocalMessage::from_remote`].
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMessage {
    pub message_id: String,
    pub receipt_handle: Option<String>,
    pub md5_of_body: String,
    pub body: String,
    pub attributes: BTreeMap<String, String>,
    pub md5_of_message_attributes: Option<String>,
    pub message_attributes: BTreeMap<String, MessageAttribute>,
}

impl LocalMessage {
    pub fn from_remote(msg: QueueMessage) -> Self {
        let md5_of_body = msg.md5_of_body.unwrap_or_else(|| md5_hex(msg.body.as_bytes()));
        Self {
            message_id: msg
                .message_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            receipt_handle: msg.receipt_handle,
            md5_of_body,
            body: msg.body,
            attributes: msg.attributes,
            md5_of_message_attributes: msg.md5_of_message_attributes,
            message_attributes: msg.message_attributes,
        }
    }
}

pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Appends; no deduplication.
    async fn put(&self, message: LocalMessage) -> Result<()>;
    async fn len(&self) -> usize;
}

#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Upserts every row by primary key.
    async fn batch_write(&self, items: Vec<Item>) -> Result<()>;
    async fn len(&self) -> usize;
}

#[async_trait]
pub trait BucketBackend: Send + Sync {
    /// Overwrites on key collision.
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()>;
    async fn len(&self) -> usize;
}

#[async_trait]
pub trait BackendLocator: Send + Sync {
    async fn find_queue(&self, name: &str) -> Option<Arc<dyn QueueBackend>>;
    async fn find_table(&self, name: &str) -> Option<Arc<dyn TableBackend>>;
    async fn find_bucket(&self, name: &str) -> Option<Arc<dyn BucketBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_remote_fills_integrity_defaults() {
        let local = LocalMessage::from_remote(QueueMessage::with_body("hello"));
        assert_eq!(local.md5_of_body, "5d41402abc4b2a76b9719d911017c592");
        assert!(!local.message_id.is_empty());
        assert!(local.md5_of_message_attributes.is_none());
    }

    #[test]
    fn test_from_remote_keeps_remote_values() {
        let mut msg = QueueMessage::with_body("hello");
        msg.message_id = Some("m-1".into());
        msg.md5_of_body = Some("remote-md5".into());
        msg.md5_of_message_attributes = Some("attr-md5".into());
        let local = LocalMessage::from_remote(msg);
        assert_eq!(local.message_id, "m-1");
        assert_eq!(local.md5_of_body, "remote-md5");
        assert_eq!(local.md5_of_message_attributes.as_deref(), Some("attr-md5"));
    }
}

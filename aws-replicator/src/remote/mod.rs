//! Remote account access.
//!
//! Enumerators only see these traits. [`AwsClientFactory`] backs them with the
//! AWS SDK; tests plug in fakes.

mod dynamodb;
mod s3;
mod sqs;

pub use dynamodb::AwsTableSource;
pub use s3::AwsObjectSource;
pub use sqs::AwsQueueSource;

use crate::error::Result;
use crate::types::{Item, ObjectSummary, QueueMessage};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_types::region::Region;
use std::sync::Arc;

#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn queue_url(&self, queue_name: &str) -> Result<String>;

    /// One receive call. An empty batch means the queue looks drained.
    async fn receive(&self, queue_url: &str, wait_time_secs: i32) -> Result<Vec<QueueMessage>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

#[async_trait]
pub trait TableSource: Send + Sync {
    async fn scan(&self, table_name: &str, exclusive_start_key: Option<Item>) -> Result<ScanPage>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    pub next_continuation_token: Option<String>,
}

#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn list_objects(&self, bucket: &str, continuation_token: Option<String>) -> Result<ObjectListing>;

    /// `Ok(None)` when the key vanished after listing.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Hands out one authenticated source per remote service.
pub trait RemoteClientFactory: Send + Sync {
    fn queues(&self) -> Arc<dyn QueueSource>;
    fn tables(&self) -> Arc<dyn TableSource>;
    fn objects(&self) -> Arc<dyn ObjectSource>;
}

pub struct AwsClientFactory {
    queues: Arc<AwsQueueSource>,
    tables: Arc<AwsTableSource>,
    objects: Arc<AwsObjectSource>,
}

impl AwsClientFactory {
    /// Default credential chain, optional region override.
    pub async fn load(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(r) = region {
            loader = loader.region(Region::new(r));
        }
        let conf = loader.load().await;
        Self::from_conf(&conf)
    }

    pub fn from_conf(conf: &aws_config::SdkConfig) -> Self {
        Self {
            queues: Arc::new(AwsQueueSource::new(aws_sdk_sqs::Client::new(conf))),
            tables: Arc::new(AwsTableSource::new(aws_sdk_dynamodb::Client::new(conf))),
            objects: Arc::new(AwsObjectSource::new(aws_sdk_s3::Client::new(conf))),
        }
    }
}

impl RemoteClientFactory for AwsClientFactory {
    fn queues(&self) -> Arc<dyn QueueSource> {
        self.queues.clone()
    }

    fn tables(&self) -> Arc<dyn TableSource> {
        self.tables.clone()
    }

    fn objects(&self) -> Arc<dyn ObjectSource> {
        self.objects.clone()
    }
}

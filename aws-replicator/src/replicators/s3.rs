use crate::backend::BackendLocator;
use crate::config::EnumerationConfig;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteClientFactory;
use crate::replicator_core::{Enumerator, Injector, ResourceDescriptor, ResourceKind};
use crate::types::{ObjectRecord, ObjectSummary};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde_json::{json, Map};
use tracing::{debug, info, warn};

pub const OBJECTS_FIELD: &str = "Objects";
pub const SKIPPED_FIELD: &str = "SkippedKeys";

/// Copies small objects of a bucket. Objects at or above
/// `max_object_size` are skipped, not transferred.
pub struct S3BucketReplicator;

impl S3BucketReplicator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for S3BucketReplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enumerator for S3BucketReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Bucket
    }

    async fn enumerate(
        &self,
        bucket: &str,
        remote: &dyn RemoteClientFactory,
        config: &EnumerationConfig,
    ) -> Result<ResourceDescriptor> {
        debug!(bucket, "copying objects from source bucket");
        let source = remote.objects();

        let mut listed: Vec<ObjectSummary> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = source.list_objects(bucket, token.take()).await?;
            pages += 1;
            listed.extend(page.objects);

            match page.next_continuation_token {
                None => break,
                Some(_) if pages >= config.max_list_pages => {
                    warn!(bucket, pages, objects = listed.len(), "list budget exhausted, replicating partial bucket");
                    break;
                }
                Some(t) => token = Some(t),
            }
        }

        let (candidates, too_large): (Vec<_>, Vec<_>) = listed
            .into_iter()
            .partition(|o| o.size < config.max_object_size);
        for o in &too_large {
            debug!(bucket, key = %o.key, size = o.size, "skip copying large object");
        }

        let fetched: Vec<Option<ObjectRecord>> = stream::iter(candidates)
            .map(|o| {
                let source = source.clone();
                async move {
                    match source.get_object(bucket, &o.key).await? {
                        Some(body) => Ok::<_, ReplicationError>(Some(ObjectRecord {
                            key: o.key,
                            size: body.len() as u64,
                            body,
                        })),
                        None => {
                            warn!(bucket, key = %o.key, "object disappeared before it could be fetched");
                            Ok(None)
                        }
                    }
                }
            })
            .buffer_unordered(config.fetch_concurrency.max(1))
            .try_collect()
            .await?;

        let mut objects: Vec<ObjectRecord> = fetched.into_iter().flatten().collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        let skipped: Vec<String> = too_large.into_iter().map(|o| o.key).collect();
        info!(bucket, objects = objects.len(), skipped = skipped.len(), "enumerated bucket");

        let mut props = Map::new();
        props.insert(ResourceKind::Bucket.name_property().into(), json!(bucket));
        props.insert(OBJECTS_FIELD.into(), json!(objects));
        props.insert(SKIPPED_FIELD.into(), json!(skipped));
        Ok(ResourceDescriptor::new(ResourceKind::Bucket, bucket, props))
    }
}

#[async_trait]
impl Injector for S3BucketReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Bucket
    }

    async fn inject(&self, descriptor: &ResourceDescriptor, backends: &dyn BackendLocator) -> Result<()> {
        let bucket_name = descriptor.resource_name(ResourceKind::Bucket);
        let objects: Vec<ObjectRecord> = descriptor.payload(OBJECTS_FIELD)?;
        let bucket = backends
            .find_bucket(&bucket_name)
            .await
            .ok_or_else(|| ReplicationError::target_missing(ResourceKind::Bucket.label(&bucket_name)))?;

        info!(bucket = %bucket_name, objects = objects.len(), "writing objects into bucket");
        for object in objects {
            bucket.put_object(&object.key, object.body).await?;
        }
        Ok(())
    }
}

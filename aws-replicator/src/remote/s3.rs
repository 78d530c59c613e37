use super::{ObjectListing, ObjectSource};
use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceKind;
use crate::types::ObjectSummary;
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::error::DisplayErrorContext;

pub struct AwsObjectSource {
    client: s3::Client,
}

impl AwsObjectSource {
    pub fn new(client: s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectSource for AwsObjectSource {
    async fn list_objects(&self, bucket: &str, continuation_token: Option<String>) -> Result<ObjectListing> {
        let label = ResourceKind::Bucket.label(bucket);
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_bucket()) {
                    ReplicationError::not_found(label.clone())
                } else {
                    ReplicationError::remote(label.clone(), DisplayErrorContext(&e).to_string())
                }
            })?;

        let objects = resp
            .contents()
            .iter()
            .filter_map(|o| {
                let key = o.key()?;
                Some(ObjectSummary {
                    key: key.to_string(),
                    size: o.size().unwrap_or_default().max(0) as u64,
                })
            })
            .collect();

        // Some S3 clones keep returning a token on the last page.
        let next_continuation_token = if resp.is_truncated().unwrap_or(false) {
            resp.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectListing {
            objects,
            next_continuation_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let label = format!("{} key '{}'", ResourceKind::Bucket.label(bucket), key);
        let resp = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(r) => r,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => return Ok(None),
            Err(e) => {
                return Err(ReplicationError::remote(label, DisplayErrorContext(&e).to_string()));
            }
        };
        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| ReplicationError::remote(label, e.to_string()))?
            .into_bytes();
        Ok(Some(bytes.to_vec()))
    }
}

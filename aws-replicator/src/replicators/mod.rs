mod dynamodb;
mod s3;
mod sqs;

pub use dynamodb::{DynamoDbTableReplicator, BATCH_WRITE_SIZE, ITEMS_FIELD};
pub use s3::{S3BucketReplicator, OBJECTS_FIELD, SKIPPED_FIELD};
pub use sqs::{SqsQueueReplicator, MESSAGES_FIELD};

use crate::registry::ReplicatorPair;
use crate::replicator_core::ResourceKind;

pub fn pair_for(kind: ResourceKind) -> ReplicatorPair {
    match kind {
        ResourceKind::Queue => ReplicatorPair::shared(SqsQueueReplicator::new()),
        ResourceKind::Table => ReplicatorPair::shared(DynamoDbTableReplicator::new()),
        ResourceKind::Bucket => ReplicatorPair::shared(S3BucketReplicator::new()),
    }
}

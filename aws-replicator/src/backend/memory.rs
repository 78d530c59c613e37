use super::{BackendLocator, BucketBackend, LocalMessage, QueueBackend, TableBackend};
use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceKind;
use crate::types::Item;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct RegionStore {
    queues: HashMap<String, Arc<MemoryQueue>>,
    tables: HashMap<String, Arc<MemoryTable>>,
    buckets: HashMap<String, Arc<MemoryBucket>>,
}

/// In-memory stores keyed by region. Lookups by name walk regions in sorted
/// order and return the first match.
#[derive(Default)]
pub struct EmulatorBackends {
    regions: RwLock<BTreeMap<String, RegionStore>>,
}

impl EmulatorBackends {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_queue(&self, region: &str, name: &str) -> Arc<MemoryQueue> {
        let mut regions = self.regions.write().await;
        regions
            .entry(region.to_string())
            .or_default()
            .queues
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryQueue::new()))
            .clone()
    }

    /// `key_attributes` is the hash key optionally followed by the range key.
    pub async fn create_table(&self, region: &str, name: &str, key_attributes: &[&str]) -> Arc<MemoryTable> {
        let mut regions = self.regions.write().await;
        regions
            .entry(region.to_string())
            .or_default()
            .tables
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryTable::new(name, key_attributes)))
            .clone()
    }

    pub async fn create_bucket(&self, region: &str, name: &str) -> Arc<MemoryBucket> {
        let mut regions = self.regions.write().await;
        regions
            .entry(region.to_string())
            .or_default()
            .buckets
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryBucket::new()))
            .clone()
    }
}

#[async_trait]
impl BackendLocator for EmulatorBackends {
    async fn find_queue(&self, name: &str) -> Option<Arc<dyn QueueBackend>> {
        let regions = self.regions.read().await;
        regions
            .values()
            .find_map(|r| r.queues.get(name))
            .map(|q| q.clone() as Arc<dyn QueueBackend>)
    }

    async fn find_table(&self, name: &str) -> Option<Arc<dyn TableBackend>> {
        let regions = self.regions.read().await;
        regions
            .values()
            .find_map(|r| r.tables.get(name))
            .map(|t| t.clone() as Arc<dyn TableBackend>)
    }

    async fn find_bucket(&self, name: &str) -> Option<Arc<dyn BucketBackend>> {
        let regions = self.regions.read().await;
        regions
            .values()
            .find_map(|r| r.buckets.get(name))
            .map(|b| b.clone() as Arc<dyn BucketBackend>)
    }
}

// ─── queue ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryQueue {
    messages: RwLock<VecDeque<LocalMessage>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<LocalMessage> {
        self.messages.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl QueueBackend for MemoryQueue {
    async fn put(&self, message: LocalMessage) -> Result<()> {
        self.messages.write().await.push_back(message);
        Ok(())
    }

    async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}

// ─── table ───────────────────────────────────────────────────────────────────

pub struct MemoryTable {
    name: String,
    key_attributes: Vec<String>,
    // Rows keyed by the JSON rendering of their key attributes.
    rows: RwLock<BTreeMap<String, Item>>,
}

impl MemoryTable {
    pub fn new(name: &str, key_attributes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            key_attributes: key_attributes.iter().map(|k| k.to_string()).collect(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn items(&self) -> Vec<Item> {
        self.rows.read().await.values().cloned().collect()
    }

    fn primary_key(&self, item: &Item) -> Result<String> {
        let mut parts = Vec::with_capacity(self.key_attributes.len());
        for attr in &self.key_attributes {
            match item.get(attr) {
                Some(v) if v.is_key_type() => parts.push(v),
                Some(_) => {
                    return Err(ReplicationError::injection(
                        ResourceKind::Table.label(&self.name),
                        format!("key attribute '{attr}' must be S, N or B"),
                    ));
                }
                None => {
                    return Err(ReplicationError::injection(
                        ResourceKind::Table.label(&self.name),
                        format!("item is missing key attribute '{attr}'"),
                    ));
                }
            }
        }
        serde_json::to_string(&parts)
            .map_err(|e| ReplicationError::injection(ResourceKind::Table.label(&self.name), e.to_string()))
    }
}

#[async_trait]
impl TableBackend for MemoryTable {
    async fn batch_write(&self, items: Vec<Item>) -> Result<()> {
        // Validate the whole batch before touching the table.
        let keyed = items
            .into_iter()
            .map(|item| Ok((self.primary_key(&item)?, item)))
            .collect::<Result<Vec<_>>>()?;
        let mut rows = self.rows.write().await;
        for (key, item) in keyed {
            rows.insert(key, item);
        }
        Ok(())
    }

    async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

// ─── bucket ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBucket {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl BucketBackend for MemoryBucket {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttrValue, QueueMessage};

    fn row(pk: &str, sk: &str, v: &str) -> Item {
        Item::from([
            ("pk".to_string(), AttrValue::S(pk.into())),
            ("sk".to_string(), AttrValue::N(sk.into())),
            ("v".to_string(), AttrValue::S(v.into())),
        ])
    }

    #[tokio::test]
    async fn test_queue_lookup_first_region_wins() {
        let backends = EmulatorBackends::new();
        let west = backends.create_queue("us-west-2", "orders").await;
        let east = backends.create_queue("us-east-1", "orders").await;

        let found = backends.find_queue("orders").await.unwrap();
        found
            .put(LocalMessage::from_remote(QueueMessage::with_body("x")))
            .await
            .unwrap();

        assert_eq!(east.len().await, 1);
        assert_eq!(west.len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_resources_are_none() {
        let backends = EmulatorBackends::new();
        backends.create_queue("us-east-1", "orders").await;
        assert!(backends.find_queue("payments").await.is_none());
        assert!(backends.find_table("orders").await.is_none());
        assert!(backends.find_bucket("orders").await.is_none());
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let backends = EmulatorBackends::new();
        let a = backends.create_bucket("us-east-1", "assets").await;
        let b = backends.create_bucket("us-east-1", "assets").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_table_upserts_on_composite_key() {
        let table = MemoryTable::new("users", &["pk", "sk"]);
        table
            .batch_write(vec![row("a", "1", "old"), row("a", "2", "other")])
            .await
            .unwrap();
        table.batch_write(vec![row("a", "1", "new")]).await.unwrap();

        let items = table.items().await;
        assert_eq!(items.len(), 2);
        assert!(items.contains(&row("a", "1", "new")));
    }

    #[tokio::test]
    async fn test_table_rejects_row_without_key_and_writes_nothing() {
        let table = MemoryTable::new("users", &["pk"]);
        let mut bad = row("b", "1", "x");
        bad.remove("pk");
        let err = table
            .batch_write(vec![row("a", "1", "x"), bad])
            .await
            .unwrap_err();
        assert!(matches!(err, ReplicationError::Injection { .. }));
        assert_eq!(table.len().await, 0);
    }

    #[tokio::test]
    async fn test_bucket_overwrites() {
        let bucket = MemoryBucket::new();
        bucket.put_object("k", b"one".to_vec()).await.unwrap();
        bucket.put_object("k", b"two".to_vec()).await.unwrap();
        assert_eq!(bucket.len().await, 1);
        assert_eq!(bucket.get("k").await.unwrap(), b"two");
    }
}

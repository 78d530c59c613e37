//! Shared test utilities.
//!
//! - Fake remote sources that count every call
//! - A receiving endpoint bound to an OS-assigned port

#![allow(dead_code)]

use async_trait::async_trait;
use aws_replicator::config::{ReplicatorConfig, TransportConfig};
use aws_replicator::remote::{
    ObjectListing, ObjectSource, QueueSource, RemoteClientFactory, ScanPage, TableSource,
};
use aws_replicator::types::{AttrValue, Item, ObjectSummary, QueueMessage};
use aws_replicator::{
    build_router, BackendLocator, EmulatorBackends, InjectionState, Registry, ReplicationError,
    Result,
};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// Queue
// =========================================================================

#[derive(Default)]
pub struct FakeQueueSource {
    batches: Mutex<HashMap<String, VecDeque<Vec<QueueMessage>>>>,
    /// Keeps returning this batch forever once the scripted ones run out.
    endless: Mutex<HashMap<String, Vec<QueueMessage>>>,
    /// Receives left before the queue starts failing.
    failing: Mutex<HashMap<String, usize>>,
    pub receive_calls: AtomicUsize,
    pub url_calls: AtomicUsize,
}

impl FakeQueueSource {
    pub fn with_batches(&self, queue: &str, batches: Vec<Vec<QueueMessage>>) {
        self.batches
            .lock()
            .unwrap()
            .insert(queue.to_string(), batches.into());
    }

    pub fn with_endless(&self, queue: &str, batch: Vec<QueueMessage>) {
        self.batches
            .lock()
            .unwrap()
            .insert(queue.to_string(), VecDeque::new());
        self.endless.lock().unwrap().insert(queue.to_string(), batch);
    }

    /// Let `successes` receives through, then fail every later one.
    pub fn fail_after(&self, queue: &str, successes: usize) {
        self.failing.lock().unwrap().insert(queue.to_string(), successes);
    }

    pub fn url_for(queue: &str) -> String {
        format!("https://sqs.us-east-1.amazonaws.com/000000000000/{queue}")
    }

    pub fn calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst) + self.url_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueSource for FakeQueueSource {
    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        if self.batches.lock().unwrap().contains_key(queue_name) {
            Ok(Self::url_for(queue_name))
        } else {
            Err(ReplicationError::not_found(format!("AWS::SQS::Queue '{queue_name}'")))
        }
    }

    async fn receive(&self, queue_url: &str, _wait_time_secs: i32) -> Result<Vec<QueueMessage>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let name = queue_url.rsplit('/').next().unwrap_or_default();
        if let Some(left) = self.failing.lock().unwrap().get_mut(name) {
            if *left == 0 {
                return Err(ReplicationError::remote(
                    format!("AWS::SQS::Queue '{name}'"),
                    "ServiceUnavailable: service is unable to handle request",
                ));
            }
            *left -= 1;
        }
        if let Some(batch) = self
            .batches
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
        {
            return Ok(batch);
        }
        Ok(self
            .endless
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn message(id: &str, body: &str) -> QueueMessage {
    let mut m = QueueMessage::with_body(body);
    m.message_id = Some(id.to_string());
    m.md5_of_body = Some(aws_replicator::backend::md5_hex(body.as_bytes()));
    m
}

// =========================================================================
// Table
// =========================================================================

/// Tables keyed on a single "pk" string attribute.
pub struct FakeTableSource {
    tables: Mutex<HashMap<String, Vec<Item>>>,
    page_size: usize,
    pub scan_calls: AtomicUsize,
}

impl FakeTableSource {
    pub fn new(page_size: usize) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            page_size,
            scan_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_table(&self, table: &str, items: Vec<Item>) {
        self.tables.lock().unwrap().insert(table.to_string(), items);
    }
}

impl Default for FakeTableSource {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl TableSource for FakeTableSource {
    async fn scan(&self, table_name: &str, exclusive_start_key: Option<Item>) -> Result<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        let Some(items) = tables.get(table_name) else {
            return Err(ReplicationError::not_found(format!("AWS::DynamoDB::Table '{table_name}'")));
        };
        let start = match exclusive_start_key.as_ref().and_then(|k| k.get("pk")) {
            Some(pk) => items.iter().position(|i| i.get("pk") == Some(pk)).map_or(items.len(), |p| p + 1),
            None => 0,
        };
        let end = (start + self.page_size).min(items.len());
        let page: Vec<Item> = items[start..end].to_vec();
        let last_evaluated_key = if end < items.len() {
            page.last()
                .and_then(|i| i.get("pk"))
                .map(|pk| Item::from([("pk".to_string(), pk.clone())]))
        } else {
            None
        };
        Ok(ScanPage {
            items: page,
            last_evaluated_key,
        })
    }
}

pub fn row(pk: &str, value: &str) -> Item {
    Item::from([
        ("pk".to_string(), AttrValue::S(pk.to_string())),
        ("value".to_string(), AttrValue::S(value.to_string())),
        ("count".to_string(), AttrValue::N("1".to_string())),
    ])
}

// =========================================================================
// Bucket
// =========================================================================

pub struct FakeObjectSource {
    buckets: Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    vanished: Mutex<HashSet<String>>,
    broken: Mutex<HashSet<String>>,
    page_size: usize,
    fetch_delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl FakeObjectSource {
    pub fn new(page_size: usize, fetch_delay: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            vanished: Mutex::new(HashSet::new()),
            broken: Mutex::new(HashSet::new()),
            page_size,
            fetch_delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bucket(&self, bucket: &str, objects: Vec<(&str, Vec<u8>)>) {
        let objects = objects
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self.buckets.lock().unwrap().insert(bucket.to_string(), objects);
    }

    /// Fetching this key fails with an access error.
    pub fn fail_on(&self, key: &str) {
        self.broken.lock().unwrap().insert(key.to_string());
    }

    /// Listed but deleted before the fetch.
    pub fn vanish(&self, key: &str) {
        self.vanished.lock().unwrap().insert(key.to_string());
    }
}

impl Default for FakeObjectSource {
    fn default() -> Self {
        Self::new(1000, Duration::ZERO)
    }
}

#[async_trait]
impl ObjectSource for FakeObjectSource {
    async fn list_objects(&self, bucket: &str, continuation_token: Option<String>) -> Result<ObjectListing> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let buckets = self.buckets.lock().unwrap();
        let Some(objects) = buckets.get(bucket) else {
            return Err(ReplicationError::not_found(format!("AWS::S3::Bucket '{bucket}'")));
        };
        let start: usize = continuation_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(objects.len());
        let page = objects
            .iter()
            .skip(start)
            .take(end - start)
            .map(|(k, v)| ObjectSummary {
                key: k.clone(),
                size: v.len() as u64,
            })
            .collect();
        Ok(ObjectListing {
            objects: page,
            next_continuation_token: (end < objects.len()).then(|| end.to_string()),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.broken.lock().unwrap().contains(key) {
            return Err(ReplicationError::remote(
                format!("AWS::S3::Bucket '{bucket}'"),
                format!("AccessDenied: GetObject {key}"),
            ));
        }
        if self.vanished.lock().unwrap().contains(key) {
            return Ok(None);
        }
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.get(key).cloned()))
    }
}

// =========================================================================
// Factory
// =========================================================================

#[derive(Default)]
pub struct FakeRemote {
    pub queues: Arc<FakeQueueSource>,
    pub tables: Arc<FakeTableSource>,
    pub objects: Arc<FakeObjectSource>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_calls(&self) -> usize {
        self.queues.calls()
            + self.tables.scan_calls.load(Ordering::SeqCst)
            + self.objects.list_calls.load(Ordering::SeqCst)
            + self.objects.get_calls.load(Ordering::SeqCst)
    }
}

impl RemoteClientFactory for FakeRemote {
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

// =========================================================================
// Local instance
// =========================================================================

/// Spin up the receiving endpoint on an OS-assigned port, returning the base URL.
pub async fn spawn_local_instance(backends: Arc<EmulatorBackends>) -> String {
    spawn_with_registry(Arc::new(Registry::standard()), backends).await
}

pub async fn spawn_with_registry(registry: Arc<Registry>, backends: Arc<dyn BackendLocator>) -> String {
    let state = Arc::new(InjectionState::new(registry, backends));
    let config = ReplicatorConfig::default();
    let app = build_router(
        state,
        &config.transport.handler_path,
        config.server.max_body_bytes,
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

pub fn config_for(endpoint: &str) -> ReplicatorConfig {
    let mut config = ReplicatorConfig::default();
    config.transport = TransportConfig::for_endpoint(endpoint);
    config.enumeration.queue_wait_time_secs = 0;
    config
}

//! Configuration for replication runs and the receiving endpoint.
//!
//! ```text
//! ReplicatorConfig
//! ├── enumeration: EnumerationConfig   # remote polling budgets, bucket policy
//! ├── transport: TransportConfig       # where the local instance listens
//! └── server: ServerConfig             # bind address when serving
//! ```
//!
//! Values can be deserialized (JSON/YAML) or read from `REPLICATOR_*`
//! environment variables with [`ReplicatorConfig::from_env`].

use crate::error::{ReplicationError, Result};
use crate::utils::env_or;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicatorConfig {
    #[serde(default)]
    pub enumeration: EnumerationConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl ReplicatorConfig {
    /// Read overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let e = EnumerationConfig::default();
        let t = TransportConfig::default();
        let s = ServerConfig::default();

        let config = Self {
            enumeration: EnumerationConfig {
                region: std::env::var("REPLICATOR_REGION").ok(),
                queue_wait_time_secs: parse_env("REPLICATOR_QUEUE_WAIT_SECS", e.queue_wait_time_secs)?,
                max_receive_polls: parse_env("REPLICATOR_MAX_RECEIVE_POLLS", e.max_receive_polls)?,
                max_scan_pages: parse_env("REPLICATOR_MAX_SCAN_PAGES", e.max_scan_pages)?,
                max_list_pages: parse_env("REPLICATOR_MAX_LIST_PAGES", e.max_list_pages)?,
                max_object_size: parse_env("REPLICATOR_MAX_OBJECT_SIZE", e.max_object_size)?,
                fetch_concurrency: parse_env("REPLICATOR_FETCH_CONCURRENCY", e.fetch_concurrency)?,
            },
            transport: TransportConfig {
                endpoint_url: env_or("REPLICATOR_ENDPOINT_URL", &t.endpoint_url),
                handler_path: env_or("REPLICATOR_HANDLER_PATH", &t.handler_path),
                timeout_secs: parse_env("REPLICATOR_TIMEOUT_SECS", t.timeout_secs)?,
            },
            server: ServerConfig {
                bind_addr: env_or("REPLICATOR_BIND_ADDR", &s.bind_addr),
                max_body_bytes: parse_env("REPLICATOR_MAX_BODY_BYTES", s.max_body_bytes)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let budgets = [
            ("max_receive_polls", self.enumeration.max_receive_polls),
            ("max_scan_pages", self.enumeration.max_scan_pages),
            ("max_list_pages", self.enumeration.max_list_pages),
        ];
        if let Some((name, _)) = budgets.iter().find(|(_, v)| *v == 0) {
            return Err(ReplicationError::Config(format!("{name} must be at least 1")));
        }
        if self.enumeration.fetch_concurrency == 0 {
            return Err(ReplicationError::Config("fetch_concurrency must be at least 1".into()));
        }
        if self.enumeration.max_object_size == 0 {
            return Err(ReplicationError::Config("max_object_size must be positive".into()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ReplicationError::Config("max_body_bytes must be positive".into()));
        }
        if self.transport.timeout_secs == 0 {
            return Err(ReplicationError::Config("timeout_secs must be positive".into()));
        }
        if !self.transport.handler_path.starts_with('/') {
            return Err(ReplicationError::Config(format!(
                "handler_path must start with '/': {}",
                self.transport.handler_path
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ReplicationError::Config(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EnumerationConfig: remote side
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationConfig {
    /// Remote region override; falls back to the default AWS provider chain.
    #[serde(default)]
    pub region: Option<String>,

    /// Long-poll wait per receive call.
    #[serde(default = "default_queue_wait_time_secs")]
    pub queue_wait_time_secs: i32,

    /// Upper bound on receive calls while draining a queue.
    #[serde(default = "default_max_receive_polls")]
    pub max_receive_polls: usize,

    /// Upper bound on scan pages per table.
    #[serde(default = "default_max_scan_pages")]
    pub max_scan_pages: usize,

    /// Upper bound on list pages per bucket.
    #[serde(default = "default_max_list_pages")]
    pub max_list_pages: usize,

    /// Objects of this size or larger are not transferred.
    #[serde(default = "default_max_object_size")]
    pub max_object_size: u64,

    /// Concurrent object downloads per bucket.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_queue_wait_time_secs() -> i32 {
    1
}

fn default_max_receive_polls() -> usize {
    1_000
}

fn default_max_scan_pages() -> usize {
    10_000
}

fn default_max_list_pages() -> usize {
    10_000
}

fn default_max_object_size() -> u64 {
    1_000_000
}

fn default_fetch_concurrency() -> usize {
    15
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            region: None,
            queue_wait_time_secs: default_queue_wait_time_secs(),
            max_receive_polls: default_max_receive_polls(),
            max_scan_pages: default_max_scan_pages(),
            max_list_pages: default_max_list_pages(),
            max_object_size: default_max_object_size(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TransportConfig / ServerConfig: local side
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the running local instance.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    #[serde(default = "default_handler_path")]
    pub handler_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint_url() -> String {
    "http://localhost:4566".to_string()
}

pub fn default_handler_path() -> String {
    "/_aws/replicator/state".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            handler_path: default_handler_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TransportConfig {
    pub fn for_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Default::default()
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint_url.trim_end_matches('/'),
            self.handler_path
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest envelope the endpoint accepts. Object bodies grow by a third
    /// once base64-encoded, so this sits far above the object threshold.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:4566".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 * 1024 // 1GB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

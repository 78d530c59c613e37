//! External-side driver: Resolve → Enumerate → Encode → Transmit, one
//! resource at a time.

use crate::config::ReplicatorConfig;
use crate::error::Result;
use crate::out::HttpBridge;
use crate::registry::Registry;
use crate::remote::RemoteClientFactory;
use crate::replicator_core::ReplicationTarget;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationReport {
    pub type_name: String,
    pub physical_id: String,
    pub bytes: usize,
}

pub struct Replicator {
    registry: Arc<Registry>,
    remote: Arc<dyn RemoteClientFactory>,
    bridge: HttpBridge,
    config: ReplicatorConfig,
}

impl Replicator {
    pub fn new(
        registry: Arc<Registry>,
        remote: Arc<dyn RemoteClientFactory>,
        config: ReplicatorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let bridge = HttpBridge::new(&config.transport)?;
        Ok(Self {
            registry,
            remote,
            bridge,
            config,
        })
    }

    pub async fn replicate(&self, target: &ReplicationTarget) -> Result<ReplicationReport> {
        // Resolve first: an unsupported kind never reaches the remote.
        let pair = self.registry.resolve(&target.type_name)?;
        let descriptor = pair
            .enumerator
            .enumerate(&target.name, self.remote.as_ref(), &self.config.enumeration)
            .await?;
        let bytes = self.bridge.send(&descriptor).await?;
        info!(resource = %descriptor.label(), bytes, "replicated resource state");
        Ok(ReplicationReport {
            type_name: descriptor.type_name,
            physical_id: descriptor.physical_id,
            bytes,
        })
    }

    /// Runs every target in order. Failures are logged and returned alongside
    /// the successes; they never stop the remaining targets.
    pub async fn replicate_all(
        &self,
        targets: &[ReplicationTarget],
    ) -> Vec<(ReplicationTarget, Result<ReplicationReport>)> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let res = self.replicate(target).await;
            if let Err(e) = &res {
                warn!(resource = %target, error = %e, "replication failed");
            }
            outcomes.push((target.clone(), res));
        }
        outcomes
    }
}

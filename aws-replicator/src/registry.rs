//! Type name → {Enumerator, Injector} lookup.
//!
//! Built once at startup and immutable afterwards. A new resource kind is
//! added by registering another pair; dispatch never changes.

use crate::error::{ReplicationError, Result};
use crate::replicator_core::{Enumerator, Injector, ResourceKind};
use crate::replicators;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReplicatorPair {
    pub enumerator: Arc<dyn Enumerator>,
    pub injector: Arc<dyn Injector>,
}

impl ReplicatorPair {
    pub fn new(enumerator: Arc<dyn Enumerator>, injector: Arc<dyn Injector>) -> Self {
        Self {
            enumerator,
            injector,
        }
    }

    /// Pair backed by one value implementing both halves.
    pub fn shared<T: Enumerator + Injector + 'static>(replicator: T) -> Self {
        let replicator = Arc::new(replicator);
        Self {
            enumerator: replicator.clone(),
            injector: replicator,
        }
    }
}

pub struct Registry {
    pairs: HashMap<String, Arc<ReplicatorPair>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            pairs: HashMap::new(),
        }
    }

    /// Queue, table and bucket pairs under their canonical names and aliases.
    pub fn standard() -> Self {
        ResourceKind::ALL
            .into_iter()
            .fold(Self::builder(), |b, kind| {
                b.register_kind(kind, replicators::pair_for(kind))
            })
            .build()
    }

    pub fn resolve(&self, type_name: &str) -> Result<Arc<ReplicatorPair>> {
        self.pairs
            .get(type_name)
            .cloned()
            .ok_or_else(|| ReplicationError::UnsupportedResourceKind(type_name.to_string()))
    }

    pub fn is_supported(&self, type_name: &str) -> bool {
        self.pairs.contains_key(type_name)
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pairs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

pub struct RegistryBuilder {
    pairs: HashMap<String, Arc<ReplicatorPair>>,
}

impl RegistryBuilder {
    /// Later registrations under the same name replace earlier ones.
    pub fn register(mut self, type_name: impl Into<String>, pair: ReplicatorPair) -> Self {
        self.pairs.insert(type_name.into(), Arc::new(pair));
        self
    }

    pub fn register_kind(mut self, kind: ResourceKind, pair: ReplicatorPair) -> Self {
        let pair = Arc::new(pair);
        self.pairs.insert(kind.type_name().to_string(), pair.clone());
        for alias in kind.aliases() {
            self.pairs.insert((*alias).to_string(), pair.clone());
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry { pairs: self.pairs }
    }
}

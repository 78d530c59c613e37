use crate::backend::BackendLocator;
use crate::config::EnumerationConfig;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteClientFactory;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Resource kinds with a replication pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Queue,
    Table,
    Bucket,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Queue, ResourceKind::Table, ResourceKind::Bucket];

    /// Canonical type name carried in the envelope.
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Queue => "AWS::SQS::Queue",
            ResourceKind::Table => "AWS::DynamoDB::Table",
            ResourceKind::Bucket => "AWS::S3::Bucket",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Queue => &["queue", "sqs"],
            ResourceKind::Table => &["table", "dynamodb"],
            ResourceKind::Bucket => &["bucket", "s3"],
        }
    }

    /// Name of the property holding the resource's own name.
    pub fn name_property(&self) -> &'static str {
        match self {
            ResourceKind::Queue => "QueueName",
            ResourceKind::Table => "TableName",
            ResourceKind::Bucket => "BucketName",
        }
    }

    pub fn from_type_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.type_name() == s || k.aliases().contains(&s))
    }

    /// "AWS::SQS::Queue 'orders'"
    pub fn label(&self, name: &str) -> String {
        format!("{} '{}'", self.type_name(), name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One resource the operator asked to replicate. The type name is kept raw so
/// dispatch, not parsing, decides whether it is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationTarget {
    pub type_name: String,
    pub name: String,
}

impl ReplicationTarget {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Parse "queue:orders,table:users". Entries without a ':' are dropped.
    pub fn parse_list(s: &str) -> Vec<ReplicationTarget> {
        s.split(',')
            .filter_map(|x| {
                let (kind, name) = x.trim().rsplit_once(':')?;
                let (kind, name) = (kind.trim(), name.trim());
                if kind.is_empty() || name.is_empty() {
                    return None;
                }
                Some(ReplicationTarget::new(kind, name))
            })
            .collect()
    }
}

impl fmt::Display for ReplicationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.type_name, self.name)
    }
}

/// Identity of one remote resource plus its replicated state. The payload
/// lives inside `properties` under a kind-specific field.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub type_name: String,
    pub physical_id: String,
    pub properties: Map<String, Value>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, physical_id: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            type_name: kind.type_name().to_string(),
            physical_id: physical_id.into(),
            properties,
        }
    }

    pub fn label(&self) -> String {
        format!("{} '{}'", self.type_name, self.physical_id)
    }

    /// Resource name from the kind's name property, else the last segment of
    /// the physical id (queue URLs end in the queue name).
    pub fn resource_name(&self, kind: ResourceKind) -> String {
        self.properties
            .get(kind.name_property())
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.physical_id
                    .rsplit('/')
                    .next()
                    .unwrap_or(&self.physical_id)
                    .to_string()
            })
    }

    /// Typed payload field; an absent field reads as the type's default.
    pub fn payload<T: DeserializeOwned + Default>(&self, field: &str) -> Result<T> {
        match self.properties.get(field) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                ReplicationError::MalformedEnvelope(format!(
                    "{}: field `Properties.{field}` has unexpected shape: {e}",
                    self.label()
                ))
            }),
        }
    }
}

/// Runs in the external context: reads the named resource from the remote
/// account and packages it as a descriptor.
#[async_trait]
pub trait Enumerator: Send + Sync {
    fn kind(&self) -> ResourceKind;
    async fn enumerate(
        &self,
        resource_name: &str,
        remote: &dyn RemoteClientFactory,
        config: &EnumerationConfig,
    ) -> Result<ResourceDescriptor>;
}

/// Runs inside the local instance: writes decoded state into the live backend.
#[async_trait]
pub trait Injector: Send + Sync {
    fn kind(&self) -> ResourceKind;
    async fn inject(&self, descriptor: &ResourceDescriptor, backends: &dyn BackendLocator) -> Result<()>;
}

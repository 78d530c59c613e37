//! Error types for state replication.
//!
//! Every failure is scoped to a single resource. Variants carry a resource
//! label (type name plus identifier) so the operator can tell which resource
//! failed in a multi-resource run.
//!
//! | Error Type | Raised by | Description |
//! |------------|-----------|-------------|
//! | `RemoteAccess` | enumerators | Credentials, network or SDK failure against the remote account |
//! | `ResourceNotFound` | enumerators | Named resource does not exist remotely |
//! | `UnsupportedResourceKind` | registry | No enumerator/injector pair for the type name |
//! | `MalformedEnvelope` | codec | Envelope schema mismatch between the two sides |
//! | `TargetResourceMissing` | injectors | Resource has not been created locally |
//! | `Injection` | injectors | Local backend rejected the replicated state |
//! | `Transport` | bridge | Local instance unreachable or answered non-success |
//! | `Config` | config | Invalid configuration |
//!
//! Nothing here is retried automatically; re-running the command is the retry.

use thiserror::Error;

/// Result type alias for replication operations.
pub type Result<T> = std::result::Result<T, ReplicationError>;

#[derive(Error, Debug)]
pub enum ReplicationError {
    #[error("Remote access error ({resource}): {message}")]
    RemoteAccess { resource: String, message: String },

    #[error("Resource not found in remote account: {resource}")]
    ResourceNotFound { resource: String },

    #[error("Unsupported resource kind: {0}")]
    UnsupportedResourceKind(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Target resource missing locally: {resource} (create it in the local instance first)")]
    TargetResourceMissing { resource: String },

    #[error("Injection error ({resource}): {message}")]
    Injection { resource: String, message: String },

    #[error("Transport error ({url}): {message}")]
    Transport { url: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReplicationError {
    pub fn remote(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteAccess {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }

    pub fn target_missing(resource: impl Into<String>) -> Self {
        Self::TargetResourceMissing {
            resource: resource.into(),
        }
    }

    pub fn injection(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Injection {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }
}

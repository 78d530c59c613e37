//! # AWS Replicator
//!
//! Copies live resource state (queue messages, table items, bucket objects)
//! from a remote AWS account into an already running local emulator.
//!
//! ```text
//!  operator machine                              local instance
//! ┌──────────────────────────────────┐        ┌───────────────────────────────┐
//! │ Registry ─► Enumerator ─► encode │ ─POST─►│ decode ─► Registry ─► Injector│
//! │             (remote SDK)         │        │           (BackendLocator)    │
//! └──────────────────────────────────┘        └───────────────────────────────┘
//! ```
//!
//! Each run is single-shot per resource. A failure before injection leaves the
//! local side untouched; a failure during injection may leave it partially
//! populated. Nothing is rolled back or retried.
//!
//! Queue injection appends (re-running duplicates messages). Table and bucket
//! injection upsert by key, so re-running them converges.

pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod out;
pub mod registry;
pub mod remote;
pub mod replicate;
pub mod replicator_core;
pub mod replicators;
pub mod types;
pub mod utils;

pub use backend::{BackendLocator, EmulatorBackends};
pub use config::ReplicatorConfig;
pub use error::{ReplicationError, Result};
pub use out::{build_router, HttpBridge, InjectionState};
pub use registry::{Registry, ReplicatorPair};
pub use remote::{AwsClientFactory, RemoteClientFactory};
pub use replicate::{ReplicationReport, Replicator};
pub use replicator_core::{Enumerator, Injector, ReplicationTarget, ResourceDescriptor, ResourceKind};

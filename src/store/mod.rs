//! Store Module
//!
//! Async facade over the remote key-value store: point reads, prefix range
//! reads, writes, and prefix watches.
//!
//! # Backends
//! - [`EtcdStore`] - etcd v3 over gRPC
//! - [`MemoryStore`] - in-process revisioned map for local runs and tests

mod etcd;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

pub use etcd::EtcdStore;
pub use memory::MemoryStore;

// == Watch Event ==
/// Kind of change a watch event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Put,
    Delete,
}

/// One change under a watched prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub key: String,
    /// Present only for puts
    pub value: Option<String>,
}

impl WatchEvent {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: WatchEventKind::Put,
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            kind: WatchEventKind::Delete,
            key: key.into(),
            value: None,
        }
    }
}

// == Range Snapshot ==
/// Result of a prefix range read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSnapshot {
    /// Entries whose key starts with the prefix, in key order
    pub entries: Vec<(String, String)>,
    /// Store revision the read was served at
    pub revision: i64,
}

/// Live sequence of event batches, in store emission order.
///
/// Dropping the stream cancels the watch and releases its connection.
pub type WatchStream = BoxStream<'static, Result<Vec<WatchEvent>>>;

// == Config Store ==
/// Operations the client needs from the remote store.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Point lookup. Absence is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// All entries whose key starts with `prefix`.
    async fn get_range(&self, prefix: &str) -> Result<RangeSnapshot>;

    /// Upserts `key`.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Subscribes to changes under `prefix`.
    ///
    /// With `start_revision`, events from that revision onward are
    /// delivered, including ones that happened before the call.
    async fn watch(&self, prefix: &str, start_revision: Option<i64>) -> Result<WatchStream>;
}

/// Shared handle to a store backend.
pub type SharedStore = Arc<dyn ConfigStore>;

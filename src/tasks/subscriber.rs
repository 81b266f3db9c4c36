//! Change Subscriber Task
//!
//! Watches a key prefix and applies every change to the cache store.
//!
//! ```text
//! STOPPED -> CONNECTING -> STREAMING
//!               ^              | stream error / close
//!               |              v
//!               +-------- RECONNECTING (backoff)
//! ```
//!
//! Each connection starts with an optional range read that reconciles the
//! cache with the store, then opens the watch at the revision right after
//! that read. Reconnects always reconcile, so deletes missed while
//! disconnected are dropped from the cache. The cache is never cleared.

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::store::{SharedStore, WatchEvent, WatchEventKind};
use crate::tasks::Backoff;

// == Subscriber State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberState {
    Stopped,
    Connecting,
    Streaming,
    Reconnecting,
}

// == Change Subscriber ==
/// The only writer to the cache.
pub struct ChangeSubscriber {
    store: SharedStore,
    cache: CacheStore,
    prefix: String,
    bulk_load: bool,
    backoff: Backoff,
    state: watch::Sender<SubscriberState>,
}

impl ChangeSubscriber {
    /// Creates a stopped subscriber for `prefix`. Bulk load is on by default.
    pub fn new(
        store: SharedStore,
        cache: CacheStore,
        prefix: impl Into<String>,
        backoff: Backoff,
    ) -> Self {
        let (state, _) = watch::channel(SubscriberState::Stopped);
        Self {
            store,
            cache,
            prefix: prefix.into(),
            bulk_load: true,
            backoff,
            state,
        }
    }

    /// Whether the first connection seeds the cache with a range read.
    pub fn with_bulk_load(mut self, bulk_load: bool) -> Self {
        self.bulk_load = bulk_load;
        self
    }

    /// Receiver tracking the subscriber's state.
    pub fn state(&self) -> watch::Receiver<SubscriberState> {
        self.state.subscribe()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // == Run ==
    /// Runs until `shutdown` is cancelled. Connection failures are logged
    /// and retried forever; they never end the loop.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Starting change subscriber on prefix {}", self.prefix);
        let mut reconcile = self.bulk_load;

        loop {
            self.set_state(SubscriberState::Connecting);

            let outcome = tokio::select! {
                _ = shutdown.cancelled() => break,
                outcome = self.stream_session(reconcile) => outcome,
            };
            reconcile = true;

            match outcome {
                Ok(()) => warn!("Watch stream on {} closed by store", self.prefix),
                Err(e) => warn!("Watch on {} failed: {}", self.prefix, e),
            }

            self.set_state(SubscriberState::Reconnecting);
            let delay = self.backoff.next_delay();
            info!("Reconnecting watch on {} in {:?}", self.prefix, delay);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(SubscriberState::Stopped);
        info!("Change subscriber on {} stopped", self.prefix);
    }

    /// One connection: optional reconcile, then stream until the watch ends.
    async fn stream_session(&mut self, reconcile: bool) -> Result<()> {
        let start_revision = if reconcile {
            let snapshot = self.store.get_range(&self.prefix).await?;
            let loaded = snapshot.entries.len();
            let removed = self
                .cache
                .replace_prefix(&self.prefix, snapshot.entries)
                .await;
            info!(
                "Reconciled {} entries under {} at revision {} ({} stale removed)",
                loaded, self.prefix, snapshot.revision, removed
            );
            Some(snapshot.revision + 1)
        } else {
            None
        };

        let mut events = self.store.watch(&self.prefix, start_revision).await?;
        self.set_state(SubscriberState::Streaming);
        self.backoff.reset();

        while let Some(batch) = events.next().await {
            for event in batch? {
                self.apply(event).await;
            }
        }
        Ok(())
    }

    async fn apply(&self, event: WatchEvent) {
        match (event.kind, event.value) {
            (WatchEventKind::Put, Some(value)) => {
                debug!("Watch PUT {}", event.key);
                self.cache.put(event.key, value).await;
            }
            (WatchEventKind::Put, None) => {
                warn!("Ignoring PUT without value for {}", event.key);
            }
            (WatchEventKind::Delete, _) => {
                debug!("Watch DELETE {}", event.key);
                self.cache.delete(&event.key).await;
            }
        }
    }

    fn set_state(&self, next: SubscriberState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!("Change subscriber {:?} -> {:?}", previous, next);
        }
    }
}

/// Spawns the subscriber loop.
///
/// Cancel `shutdown` and await the handle to stop it; the watch connection
/// is released when the loop exits.
pub fn spawn_subscriber(subscriber: ChangeSubscriber, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(subscriber.run(shutdown))
}

//! In-Memory Store Backend
//!
//! A revisioned map with an event history and broadcast watches. Behaves
//! like a single-node etcd for local runs and tests, including outages.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use super::{ConfigStore, RangeSnapshot, WatchEvent, WatchStream};
use crate::error::{Result, RigelError};

/// Buffered live events per watcher before it is considered lagging.
const WATCH_CHANNEL_CAPACITY: usize = 1024;

type Revisioned = (i64, WatchEvent);

#[derive(Debug)]
struct MemoryInner {
    entries: BTreeMap<String, String>,
    revision: i64,
    history: Vec<Revisioned>,
    events: broadcast::Sender<Revisioned>,
    available: bool,
}

impl MemoryInner {
    fn check_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(RigelError::StoreUnavailable(
                "memory store is offline".to_string(),
            ))
        }
    }

    fn record(&mut self, event: WatchEvent) {
        self.revision += 1;
        self.history.push((self.revision, event.clone()));
        // No receivers is fine; nobody is watching yet.
        let _ = self.events.send((self.revision, event));
    }

    fn close_watchers(&mut self) {
        let (events, _) = broadcast::channel(WATCH_CHANNEL_CAPACITY);
        self.events = events;
    }
}

// == Memory Store ==
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(WATCH_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(MemoryInner {
                entries: BTreeMap::new(),
                revision: 0,
                history: Vec::new(),
                events,
                available: true,
            }),
        }
    }

    /// Removes `key`. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        if inner.entries.remove(key).is_none() {
            return Ok(false);
        }
        inner.record(WatchEvent::delete(key));
        Ok(true)
    }

    /// Current store revision.
    pub async fn revision(&self) -> i64 {
        self.inner.lock().await.revision
    }

    /// Ends every open watch stream, as a dropped connection would.
    pub async fn disconnect_watchers(&self) {
        self.inner.lock().await.close_watchers();
        debug!("Memory store disconnected all watchers");
    }

    /// Takes the store offline or back online. Going offline also ends
    /// open watches.
    pub async fn set_available(&self, available: bool) {
        let mut inner = self.inner.lock().await;
        inner.available = available;
        if !available {
            inner.close_watchers();
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().await;
        inner.check_available()?;
        Ok(inner.entries.get(key).cloned())
    }

    async fn get_range(&self, prefix: &str) -> Result<RangeSnapshot> {
        let inner = self.inner.lock().await;
        inner.check_available()?;
        let entries = inner
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(RangeSnapshot {
            entries,
            revision: inner.revision,
        })
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        inner.entries.insert(key.to_string(), value.to_string());
        inner.record(WatchEvent::put(key, value));
        Ok(())
    }

    async fn watch(&self, prefix: &str, start_revision: Option<i64>) -> Result<WatchStream> {
        let (replay, receiver) = {
            let inner = self.inner.lock().await;
            inner.check_available()?;
            // Collected under the same lock as the subscription: no gap, no overlap.
            let replay: VecDeque<WatchEvent> = match start_revision {
                Some(start) => inner
                    .history
                    .iter()
                    .filter(|(rev, event)| *rev >= start && event.key.starts_with(prefix))
                    .map(|(_, event)| event.clone())
                    .collect(),
                None => VecDeque::new(),
            };
            (replay, inner.events.subscribe())
        };

        let prefix = prefix.to_string();
        let state = Some((replay, receiver, prefix));
        let events = futures::stream::unfold(state, |state| async move {
            let (mut replay, mut receiver, prefix) = state?;
            if let Some(event) = replay.pop_front() {
                return Some((Ok(vec![event]), Some((replay, receiver, prefix))));
            }
            loop {
                match receiver.recv().await {
                    Ok((_, event)) if event.key.starts_with(&prefix) => {
                        return Some((Ok(vec![event]), Some((replay, receiver, prefix))));
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Memory watch on {} lagged by {} events", prefix, skipped);
                        return Some((
                            Err(RigelError::StoreUnavailable(format!(
                                "watch lagged by {} events",
                                skipped
                            ))),
                            None,
                        ));
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}

//! Cache Store Module
//!
//! Full in-memory mirror of the watched subtree. No eviction, no TTL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStatsSnapshot};

// == Cache Store ==
/// Concurrent key/value mirror.
///
/// Cloning yields another handle to the same cache. Every operation holds
/// the internal lock only for the map access itself; callers must never
/// await store I/O while using it.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    stats: Arc<CacheStats>,
}

impl CacheStore {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores `value` under `key`, overwriting any previous value.
    pub async fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
        self.stats.record_put();
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key is a no-op.
    pub async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
        self.stats.record_delete();
    }

    // == Get ==
    /// Returns the cached value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        let value = self.entries.read().await.get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Snapshot ==
    /// Copies the whole cache, sorted by key.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // == Replace Prefix ==
    /// Makes the subtree under `prefix` equal to `entries`.
    ///
    /// Keys under `prefix` missing from `entries` are dropped, everything
    /// in `entries` is written. Keys outside `prefix` are untouched.
    /// Returns the number of keys removed.
    pub async fn replace_prefix(&self, prefix: &str, entries: Vec<(String, String)>) -> usize {
        let mut map = self.entries.write().await;
        let incoming: HashMap<String, String> = entries.into_iter().collect();

        let before = map.len();
        map.retain(|key, _| !key.starts_with(prefix) || incoming.contains_key(key));
        let removed = before - map.len();

        map.extend(incoming);
        self.stats.record_reconcile();
        removed
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStatsSnapshot {
        let total = self.len().await;
        self.stats.snapshot(total)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_put_and_get() {
        let store = CacheStore::new();

        store.put("key1", "value1").await;

        assert_eq!(store.get("key1").await.as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = CacheStore::new();
        assert_eq!(store.get("nonexistent").await, None);
    }

    #[tokio::test]
    async fn test_store_delete() {
        let store = CacheStore::new();

        store.put("key1", "value1").await;
        store.delete("key1").await;

        assert!(store.is_empty().await);
        assert_eq!(store.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_store_delete_nonexistent_is_noop() {
        let store = CacheStore::new();
        store.put("key1", "value1").await;

        store.delete("nonexistent").await;

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = CacheStore::new();

        store.put("key1", "value1").await;
        store.put("key1", "value2").await;

        assert_eq!(store.get("key1").await.as_deref(), Some("value2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let writer = CacheStore::new();
        let reader = writer.clone();

        writer.put("shared", "yes").await;

        assert_eq!(reader.get("shared").await.as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_snapshot_sorted() {
        let store = CacheStore::new();
        store.put("b", "2").await;
        store.put("a", "1").await;

        let snapshot = store.snapshot().await;
        let keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_replace_prefix_drops_missing_keys_only_under_prefix() {
        let store = CacheStore::new();
        store.put("/root/a/x", "old").await;
        store.put("/root/a/gone", "old").await;
        store.put("/root/b/keep", "old").await;

        let removed = store
            .replace_prefix(
                "/root/a/",
                vec![
                    ("/root/a/x".to_string(), "new".to_string()),
                    ("/root/a/y".to_string(), "added".to_string()),
                ],
            )
            .await;

        assert_eq!(removed, 1);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.get("/root/a/x").map(String::as_str), Some("new"));
        assert_eq!(snapshot.get("/root/a/y").map(String::as_str), Some("added"));
        assert_eq!(snapshot.get("/root/b/keep").map(String::as_str), Some("old"));
        assert!(!snapshot.contains_key("/root/a/gone"));
    }

    #[tokio::test]
    async fn test_store_stats() {
        let store = CacheStore::new();

        store.put("key1", "value1").await;
        store.get("key1").await; // hit
        store.get("nonexistent").await; // miss
        store.delete("key1").await;

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.puts_applied, 1);
        assert_eq!(stats.deletes_applied, 1);
        assert_eq!(stats.total_entries, 0);
    }
}

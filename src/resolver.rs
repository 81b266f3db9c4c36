//! Config Resolver
//!
//! Public lookup and write API. Reads go either straight to the store
//! (`fetch`, fresh) or to the local cache (`fetch_cached`, fast but
//! possibly lagging). Writes go to the store only; the cache catches up
//! through the watch stream, so read-your-write needs `fetch`.

use std::collections::BTreeMap;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::cache::{CacheStatsSnapshot, CacheStore};
use crate::error::Result;
use crate::keys::{ConfigAddress, KeyCodec, NamedConfigAddress};
use crate::store::SharedStore;
use crate::tasks::SubscriberState;

// == Config Resolver ==
#[derive(Clone)]
pub struct ConfigResolver {
    codec: KeyCodec,
    store: SharedStore,
    cache: CacheStore,
    subscriber_state: watch::Receiver<SubscriberState>,
}

impl ConfigResolver {
    pub fn new(
        codec: KeyCodec,
        store: SharedStore,
        cache: CacheStore,
        subscriber_state: watch::Receiver<SubscriberState>,
    ) -> Self {
        Self {
            codec,
            store,
            cache,
            subscriber_state,
        }
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    // == Fetch ==
    /// Reads the current value from the store.
    ///
    /// Absence is `Ok(None)`; store failures are returned as is.
    pub async fn fetch(&self, address: &ConfigAddress) -> Result<Option<String>> {
        let key = self.codec.encode_key(address)?;
        let value = self.store.get(&key).await?;
        debug!("Direct fetch {} -> {}", key, found(&value));
        Ok(value)
    }

    // == Fetch Cached ==
    /// Reads the value from the local cache without touching the store.
    pub async fn fetch_cached(&self, address: &ConfigAddress) -> Result<Option<String>> {
        let key = self.codec.encode_key(address)?;
        let value = self.cache.get(&key).await;
        debug!("Cached fetch {} -> {}", key, found(&value));
        Ok(value)
    }

    // == Fetch Named Config ==
    /// Reads every parameter of a named config from the store, keyed by
    /// parameter name.
    pub async fn fetch_named_config(
        &self,
        named: &NamedConfigAddress,
    ) -> Result<BTreeMap<String, String>> {
        let prefix = self.codec.encode_prefix(named)?;
        let snapshot = self.store.get_range(&prefix).await?;
        Ok(snapshot
            .entries
            .into_iter()
            .filter_map(|(key, value)| {
                self.codec
                    .parameter_name(&prefix, &key)
                    .map(|name| (name.to_string(), value))
            })
            .collect())
    }

    // == Put ==
    /// Writes `value` through to the store. The cache is not touched.
    pub async fn put(&self, address: &ConfigAddress, value: &str) -> Result<()> {
        let key = self.codec.encode_key(address)?;
        match self.store.put(&key, value).await {
            Ok(()) => {
                info!("Stored value for parameter {}", address);
                Ok(())
            }
            Err(e) => {
                error!("Failed to store {}: {}", key, e);
                Err(e)
            }
        }
    }

    /// Current state of the change subscriber feeding the cache.
    pub fn subscriber_state(&self) -> SubscriberState {
        *self.subscriber_state.borrow()
    }

    pub async fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats().await
    }
}

fn found(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "hit"
    } else {
        "miss"
    }
}

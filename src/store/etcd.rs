//! etcd Store Backend
//!
//! Implements [`ConfigStore`] over the etcd v3 gRPC API.

use std::time::Duration;

use async_trait::async_trait;
use etcd_client::{
    Client, ConnectOptions, Event, EventType, GetOptions, WatchOptions,
    WatchStream as EtcdWatchStream, Watcher,
};
use futures::StreamExt;
use tonic::Code;
use tracing::{debug, info, warn};

use super::{ConfigStore, RangeSnapshot, WatchEvent, WatchStream};
use crate::error::{Result, RigelError};
use crate::keys::prefix_range_end;

// == Etcd Store ==
/// etcd-backed store. Cloning the inner client is cheap and shares the channel.
#[derive(Clone)]
pub struct EtcdStore {
    client: Client,
}

impl EtcdStore {
    /// Connects to the given endpoints.
    ///
    /// `request_timeout` bounds every unary call; there is no retry beyond
    /// the transport's own.
    pub async fn connect(
        endpoints: &[String],
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let options = ConnectOptions::new()
            .with_timeout(request_timeout)
            .with_connect_timeout(connect_timeout);
        let client = Client::connect(endpoints, Some(options))
            .await
            .map_err(map_error)?;
        info!("Connected to etcd at {:?}", endpoints);
        Ok(Self { client })
    }
}

#[async_trait]
impl ConfigStore for EtcdStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut client = self.client.clone();
        let resp = client.get(key, None).await.map_err(map_error)?;
        Ok(resp
            .kvs()
            .first()
            .map(|kv| String::from_utf8_lossy(kv.value()).into_owned()))
    }

    async fn get_range(&self, prefix: &str) -> Result<RangeSnapshot> {
        let mut client = self.client.clone();
        let options = GetOptions::new().with_range(prefix_range_end(prefix.as_bytes()));
        let resp = client.get(prefix, Some(options)).await.map_err(map_error)?;

        let revision = resp.header().map(|h| h.revision()).unwrap_or_default();
        let entries = resp
            .kvs()
            .iter()
            .filter_map(|kv| match kv.key_str() {
                Ok(key) => Some((
                    key.to_string(),
                    String::from_utf8_lossy(kv.value()).into_owned(),
                )),
                Err(e) => {
                    warn!("Skipping non UTF-8 key under {}: {}", prefix, e);
                    None
                }
            })
            .collect();

        Ok(RangeSnapshot { entries, revision })
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut client = self.client.clone();
        client.put(key, value, None).await.map_err(map_error)?;
        debug!("Stored value for key {}", key);
        Ok(())
    }

    async fn watch(&self, prefix: &str, start_revision: Option<i64>) -> Result<WatchStream> {
        let mut client = self.client.clone();
        let mut options = WatchOptions::new().with_range(prefix_range_end(prefix.as_bytes()));
        if let Some(revision) = start_revision {
            options = options.with_start_revision(revision);
        }
        let (watcher, stream) = client
            .watch(prefix, Some(options))
            .await
            .map_err(map_error)?;
        info!(
            "Opened etcd watch {} on {} from revision {:?}",
            watcher.watch_id(),
            prefix,
            start_revision
        );

        // The watcher travels with the stream so both drop together.
        let state: Option<(Watcher, EtcdWatchStream)> = Some((watcher, stream));
        let events = futures::stream::unfold(state, |state| async move {
            let (watcher, mut stream) = state?;
            match stream.message().await {
                Ok(Some(resp)) if resp.canceled() => Some((
                    Err(RigelError::StoreUnavailable(format!(
                        "watch canceled by server (compact revision {}): {}",
                        resp.compact_revision(),
                        resp.cancel_reason()
                    ))),
                    None,
                )),
                Ok(Some(resp)) => {
                    let batch = resp.events().iter().filter_map(convert_event).collect();
                    Some((Ok(batch), Some((watcher, stream))))
                }
                Ok(None) => None,
                Err(e) => Some((Err(map_error(e)), None)),
            }
        });

        Ok(events.boxed())
    }
}

fn convert_event(event: &Event) -> Option<WatchEvent> {
    let kv = event.kv()?;
    let key = match kv.key_str() {
        Ok(key) => key.to_string(),
        Err(e) => {
            warn!("Ignoring watch event with non UTF-8 key: {}", e);
            return None;
        }
    };
    match event.event_type() {
        EventType::Put => Some(WatchEvent::put(
            key,
            String::from_utf8_lossy(kv.value()).into_owned(),
        )),
        EventType::Delete => Some(WatchEvent::delete(key)),
    }
}

/// Splits client failures into retryable connectivity problems and
/// server-side rejections.
fn map_error(err: etcd_client::Error) -> RigelError {
    use etcd_client::Error;

    match err {
        Error::GRpcStatus(status) => status_to_error(status.code(), status.message()),
        Error::TransportError(e) => RigelError::StoreUnavailable(e.to_string()),
        Error::IoError(e) => RigelError::StoreUnavailable(e.to_string()),
        Error::WatchError(msg) => RigelError::StoreUnavailable(msg),
        other => RigelError::StoreRejected(other.to_string()),
    }
}

fn status_to_error(code: Code, message: &str) -> RigelError {
    match code {
        Code::Unavailable
        | Code::DeadlineExceeded
        | Code::Cancelled
        | Code::Aborted
        | Code::Unknown => RigelError::StoreUnavailable(format!("{:?}: {}", code, message)),
        _ => RigelError::StoreRejected(format!("{:?}: {}", code, message)),
    }
}

//! Rigel Client - configuration distribution over etcd
//!
//! Runs the change subscriber and exposes the resolver over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rigel_client::api::create_router;
use rigel_client::cache::CacheStore;
use rigel_client::config::StoreBackend;
use rigel_client::keys::KeyCodec;
use rigel_client::store::{EtcdStore, MemoryStore, SharedStore};
use rigel_client::tasks::Backoff;
use rigel_client::{spawn_subscriber, AppState, ChangeSubscriber, Config, ConfigResolver};

/// Main entry point for the Rigel configuration client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store backend and create the empty cache
/// 4. Start the change subscriber
/// 5. Serve the HTTP API on the configured port
/// 6. On SIGINT/SIGTERM stop the server, then the subscriber
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rigel_client=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rigel configuration client");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, endpoints={:?}, prefix={}, port={}, bulk_load={}",
        config.store_backend,
        config.etcd_endpoints,
        config.key_prefix,
        config.server_port,
        config.bulk_load
    );

    let codec = KeyCodec::new(config.key_prefix.clone()).context("invalid RIGEL_KEY_PREFIX")?;

    let store: SharedStore = match config.store_backend {
        StoreBackend::Etcd => Arc::new(
            EtcdStore::connect(
                &config.etcd_endpoints,
                config.request_timeout(),
                config.connect_timeout(),
            )
            .await
            .context("failed to connect to etcd")?,
        ),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let cache = CacheStore::new();

    let subscriber = ChangeSubscriber::new(
        store.clone(),
        cache.clone(),
        codec.watch_prefix(),
        Backoff::new(
            config.reconnect_initial_backoff(),
            config.reconnect_max_backoff(),
        ),
    )
    .with_bulk_load(config.bulk_load);
    let subscriber_state = subscriber.state();

    let shutdown = CancellationToken::new();
    let subscriber_handle = spawn_subscriber(subscriber, shutdown.clone());
    info!("Change subscriber started");

    let resolver = ConfigResolver::new(codec, store, cache, subscriber_state);
    let app = create_router(AppState::new(resolver));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    subscriber_handle
        .await
        .context("change subscriber panicked")?;

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

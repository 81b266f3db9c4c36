//! API Routes
//!
//! Configures the Axum router with all configuration endpoints.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    fetch_cached_config_handler, fetch_config_handler, fetch_named_config_handler,
    health_handler, put_config_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/fetchConfig", get(fetch_config_handler))
        .route("/fetchCachedConfig", get(fetch_cached_config_handler))
        .route("/fetchNamedConfig", get(fetch_named_config_handler))
        .route("/putConfig", put(put_config_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tokio::sync::watch;
    use tower::util::ServiceExt;

    use crate::cache::CacheStore;
    use crate::keys::KeyCodec;
    use crate::resolver::ConfigResolver;
    use crate::store::MemoryStore;
    use crate::tasks::SubscriberState;

    fn create_test_app() -> Router {
        let (_tx, rx) = watch::channel(SubscriberState::Stopped);
        let resolver = ConfigResolver::new(
            KeyCodec::new("/root").unwrap(),
            Arc::new(MemoryStore::new()),
            CacheStore::new(),
            rx,
        );
        create_router(AppState::new(resolver))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_query_parameter_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/fetchConfig?version=v1&appName=AppX")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

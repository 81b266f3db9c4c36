//! API Handlers
//!
//! Thin mapping between HTTP requests and [`ConfigResolver`] calls.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{Result, RigelError};
use crate::keys::{ConfigAddress, NamedConfigAddress};
use crate::models::{
    ConfigQuery, ConfigValueResponse, HealthResponse, NamedConfigQuery, NamedConfigResponse,
    PutConfigResponse, StatsResponse,
};
use crate::resolver::ConfigResolver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: ConfigResolver,
}

impl AppState {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self { resolver }
    }
}

/// Handler for GET /fetchConfig
pub async fn fetch_config_handler(
    State(state): State<AppState>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<ConfigValueResponse>> {
    let address = ConfigAddress::from(query);
    let value = state.resolver.fetch(&address).await?;
    value_response(&state, &address, value)
}

/// Handler for GET /fetchCachedConfig
pub async fn fetch_cached_config_handler(
    State(state): State<AppState>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<ConfigValueResponse>> {
    let address = ConfigAddress::from(query);
    let value = state.resolver.fetch_cached(&address).await?;
    value_response(&state, &address, value)
}

fn value_response(
    state: &AppState,
    address: &ConfigAddress,
    value: Option<String>,
) -> Result<Json<ConfigValueResponse>> {
    let key = state.resolver.codec().encode_key(address)?;
    match value {
        Some(value) => Ok(Json(ConfigValueResponse::new(key, value))),
        None => Err(RigelError::NotFound(key)),
    }
}

/// Handler for GET /fetchNamedConfig
pub async fn fetch_named_config_handler(
    State(state): State<AppState>,
    Query(query): Query<NamedConfigQuery>,
) -> Result<Json<NamedConfigResponse>> {
    let named = NamedConfigAddress::from(query);
    let parameters = state.resolver.fetch_named_config(&named).await?;
    let prefix = state.resolver.codec().encode_prefix(&named)?;
    Ok(Json(NamedConfigResponse { prefix, parameters }))
}

/// Handler for PUT /putConfig
///
/// The request body is stored verbatim as the value.
pub async fn put_config_handler(
    State(state): State<AppState>,
    Query(query): Query<ConfigQuery>,
    body: String,
) -> Result<Json<PutConfigResponse>> {
    let address = ConfigAddress::from(query);
    state.resolver.put(&address, &body).await?;
    let key = state.resolver.codec().encode_key(&address)?;
    Ok(Json(PutConfigResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.resolver.cache_stats().await))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(state.resolver.subscriber_state()))
}

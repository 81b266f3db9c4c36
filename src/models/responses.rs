//! Response DTOs for the configuration API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStatsSnapshot;
use crate::tasks::SubscriberState;

/// Response body for the fetch endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValueResponse {
    /// Encoded store key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl ConfigValueResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for PUT /putConfig
#[derive(Debug, Clone, Serialize)]
pub struct PutConfigResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
}

impl PutConfigResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
        }
    }
}

/// Response body for GET /fetchNamedConfig
#[derive(Debug, Clone, Serialize)]
pub struct NamedConfigResponse {
    /// Key prefix the parameters live under
    pub prefix: String,
    /// Parameter name to value
    pub parameters: BTreeMap<String, String>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub cache: CacheStatsSnapshot,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStatsSnapshot> for StatsResponse {
    fn from(cache: CacheStatsSnapshot) -> Self {
        let hit_rate = cache.hit_rate();
        Self { cache, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" while the cache is streaming, "degraded" otherwise
    pub status: String,
    /// Change subscriber state
    pub subscriber: SubscriberState,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn from_state(subscriber: SubscriberState) -> Self {
        let status = match subscriber {
            SubscriberState::Streaming => "healthy",
            _ => "degraded",
        };
        Self {
            status: status.to_string(),
            subscriber,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_response_serialize() {
        let resp = PutConfigResponse::new("/root/a");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("/root/a"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let resp = StatsResponse::from(CacheStatsSnapshot {
            hits: 3,
            misses: 1,
            total_entries: 2,
            ..Default::default()
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 3);
        assert_eq!(json["total_entries"], 2);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_response_reflects_subscriber() {
        let resp = HealthResponse::from_state(SubscriberState::Streaming);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("streaming"));
        assert!(json.contains("timestamp"));

        let resp = HealthResponse::from_state(SubscriberState::Reconnecting);
        assert_eq!(resp.status, "degraded");
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}

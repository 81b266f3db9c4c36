//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which store implementation backs the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote etcd cluster
    Etcd,
    /// In-process store, for local runs without a cluster
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "etcd" => Ok(StoreBackend::Etcd),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// etcd endpoints to connect to
    pub etcd_endpoints: Vec<String>,
    /// Root prefix every configuration key lives under
    pub key_prefix: String,
    /// Store implementation
    pub store_backend: StoreBackend,
    /// HTTP server port
    pub server_port: u16,
    /// Per-request timeout for store calls in milliseconds
    pub request_timeout_ms: u64,
    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Seed the cache with a range read before streaming the first watch
    pub bulk_load: bool,
    /// First reconnect delay in milliseconds
    pub reconnect_initial_backoff_ms: u64,
    /// Upper bound for the reconnect delay in milliseconds
    pub reconnect_max_backoff_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ETCD_ENDPOINTS` - Comma-separated endpoints (default: http://127.0.0.1:2379)
    /// - `RIGEL_KEY_PREFIX` - Root key prefix (default: /remiges/rigel)
    /// - `STORE_BACKEND` - `etcd` or `memory` (default: etcd)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_REQUEST_TIMEOUT_MS` - Store request timeout (default: 5000)
    /// - `STORE_CONNECT_TIMEOUT_MS` - Store connect timeout (default: 3000)
    /// - `WATCH_BULK_LOAD` - Initial range read before watching (default: true)
    /// - `RECONNECT_INITIAL_BACKOFF_MS` - First reconnect delay (default: 500)
    /// - `RECONNECT_MAX_BACKOFF_MS` - Reconnect delay cap (default: 30000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            etcd_endpoints: env::var("ETCD_ENDPOINTS")
                .ok()
                .map(|v| parse_endpoints(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.etcd_endpoints),
            key_prefix: env::var("RIGEL_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            store_backend: parse_var("STORE_BACKEND").unwrap_or(defaults.store_backend),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            request_timeout_ms: parse_var("STORE_REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            connect_timeout_ms: parse_var("STORE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout_ms),
            bulk_load: parse_var("WATCH_BULK_LOAD").unwrap_or(defaults.bulk_load),
            reconnect_initial_backoff_ms: parse_var("RECONNECT_INITIAL_BACKOFF_MS")
                .unwrap_or(defaults.reconnect_initial_backoff_ms),
            reconnect_max_backoff_ms: parse_var("RECONNECT_MAX_BACKOFF_MS")
                .unwrap_or(defaults.reconnect_max_backoff_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_backoff_ms)
    }

    pub fn reconnect_max_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_backoff_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            etcd_endpoints: vec!["http://127.0.0.1:2379".to_string()],
            key_prefix: "/remiges/rigel".to_string(),
            store_backend: StoreBackend::Etcd,
            server_port: 3000,
            request_timeout_ms: 5000,
            connect_timeout_ms: 3000,
            bulk_load: true,
            reconnect_initial_backoff_ms: 500,
            reconnect_max_backoff_ms: 30_000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_endpoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.etcd_endpoints, vec!["http://127.0.0.1:2379"]);
        assert_eq!(config.key_prefix, "/remiges/rigel");
        assert_eq!(config.store_backend, StoreBackend::Etcd);
        assert_eq!(config.server_port, 3000);
        assert!(config.bulk_load);
        assert_eq!(config.reconnect_max_backoff(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("ETCD_ENDPOINTS");
        env::remove_var("RIGEL_KEY_PREFIX");
        env::remove_var("STORE_BACKEND");
        env::remove_var("SERVER_PORT");
        env::remove_var("WATCH_BULK_LOAD");

        let config = Config::from_env();
        assert_eq!(config.etcd_endpoints.len(), 1);
        assert_eq!(config.key_prefix, "/remiges/rigel");
        assert_eq!(config.server_port, 3000);
        assert!(config.bulk_load);
    }

    #[test]
    fn test_parse_endpoints_skips_blanks() {
        let endpoints = parse_endpoints(" http://a:2379, ,http://b:2379 ,");
        assert_eq!(endpoints, vec!["http://a:2379", "http://b:2379"]);
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("ETCD".parse::<StoreBackend>(), Ok(StoreBackend::Etcd));
        assert_eq!(" memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}

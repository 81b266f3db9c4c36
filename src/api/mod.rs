//! API Module
//!
//! HTTP handlers and routing for the configuration REST API.
//!
//! # Endpoints
//! - `GET /fetchConfig` - Read a parameter straight from the store
//! - `GET /fetchCachedConfig` - Read a parameter from the local cache
//! - `GET /fetchNamedConfig` - Read every parameter of a named config
//! - `PUT /putConfig` - Write a parameter (raw body is the value)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Subscriber health

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

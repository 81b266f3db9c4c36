//! Request and Response models for the configuration API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ConfigQuery, NamedConfigQuery};
pub use responses::{
    ConfigValueResponse, ErrorResponse, HealthResponse, NamedConfigResponse, PutConfigResponse,
    StatsResponse,
};

//! Error types for the configuration client
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Rigel Error Enum ==
/// Unified error type for the configuration client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigelError {
    /// Address component is empty or contains the key separator
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Connection or timeout failure talking to the store; retryable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store declined the request; not retried automatically
    #[error("Store rejected request: {0}")]
    StoreRejected(String),

    /// No value under the requested key
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl RigelError {
    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RigelError::StoreUnavailable(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for RigelError {
    fn into_response(self) -> Response {
        let status = match &self {
            RigelError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            RigelError::NotFound(_) => StatusCode::NOT_FOUND,
            RigelError::StoreRejected(_) => StatusCode::BAD_GATEWAY,
            RigelError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the configuration client.
pub type Result<T> = std::result::Result<T, RigelError>;

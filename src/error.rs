//! Error types for the shortener service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

// == Registry Error Enum ==
/// Unified error type for registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Key absent from both tiers, or present but past its expiry
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key generation retry budget exceeded during creation
    #[error("Key space exhausted after {0} attempts")]
    KeySpaceExhausted(usize),

    /// Durable store read or write failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Stored record could not be deserialized
    #[error("Malformed record for key: {0}")]
    MalformedRecord(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            // A malformed record is indistinguishable from a missing one
            // from the caller's point of view.
            RegistryError::MalformedRecord(_) => StatusCode::NOT_FOUND,
            RegistryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RegistryError::KeySpaceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

//! Response DTOs for the shortener API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::registry::{Entry, UsageSummary};

/// Response body for the create operation (POST /create)
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    /// Success message
    pub message: String,
    /// The assigned short key
    pub key: String,
    /// When the entry expires; null = never
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateResponse {
    /// Creates a CreateResponse from a freshly created entry.
    pub fn new(entry: &Entry) -> Self {
        Self {
            message: format!("Short key '{}' created successfully", entry.key),
            key: entry.key.clone(),
            expires_at: entry.expires_at,
        }
    }
}

/// Response body for the summary operation (GET /:key/summary)
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    /// The short key
    pub key: String,
    /// Calls recorded today
    pub day_calls: u64,
    /// Calls recorded in the trailing week
    pub week_calls: u64,
    /// Calls recorded since creation
    pub total_calls: u64,
}

impl SummaryResponse {
    /// Creates a SummaryResponse from a usage summary.
    pub fn new(key: impl Into<String>, summary: UsageSummary) -> Self {
        Self {
            key: key.into(),
            day_calls: summary.day_calls,
            week_calls: summary.week_calls,
            total_calls: summary.total_calls,
        }
    }
}

/// Response body for the delete operation (DELETE /:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
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
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

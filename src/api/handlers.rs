//! API Handlers
//!
//! HTTP request handlers for each shortener endpoint. Each handler is a
//! thin dispatch onto one registry operation.

use std::sync::Arc;

use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use chrono::Utc;

use crate::error::{RegistryError, Result};
use crate::models::{
    CreateRequest, CreateResponse, DeleteResponse, HealthResponse, SummaryResponse,
};
use crate::registry::Registry;
use crate::store::{FileStore, MemoryStore};

/// Application state shared across all handlers.
///
/// The registry is held behind a single `Arc<RwLock<_>>`: lookups take the
/// read lock, mutations take the write lock, which linearizes all
/// operations on the same key.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe registry
    pub registry: Arc<RwLock<Registry>>,
}

impl AppState {
    /// Creates a new AppState owning the given registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Creates an AppState with a file-backed durable store rooted at the
    /// configured data directory.
    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self::new(Registry::new(Box::new(store))))
    }

    /// Creates an AppState over an in-memory store, for tests.
    pub fn in_memory() -> Self {
        Self::new(Registry::new(Box::new(MemoryStore::new())))
    }
}

/// Handler for POST /create
///
/// Validates the request, then creates a new entry and reports its key.
pub async fn create_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<CreateResponse>> {
    let ttl_secs = req.validate().map_err(RegistryError::InvalidRequest)?;

    let mut registry = state.registry.write().await;
    let entry = registry.create(req.url, ttl_secs)?;

    Ok(Json(CreateResponse::new(&entry)))
}

/// Handler for GET /:key
///
/// Records the resolution on the entry's usage counter and redirects to the
/// long URL.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Redirect> {
    // Write lock: touch mutates usage state and may warm the cache.
    let mut registry = state.registry.write().await;
    let entry = registry.touch(&key)?;

    Ok(Redirect::temporary(&entry.long_url))
}

/// Handler for GET /:key/summary
///
/// Reports usage statistics without counting as a resolution.
pub async fn summary_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SummaryResponse>> {
    let registry = state.registry.read().await;
    let entry = registry.resolve(&key)?;
    let summary = entry.usage.summary(Utc::now());

    Ok(Json(SummaryResponse::new(key, summary)))
}

/// Handler for DELETE /:key
///
/// Deletes a key from both tiers.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut registry = state.registry.write().await;
    registry.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

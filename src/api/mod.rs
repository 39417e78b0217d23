//! API Module
//!
//! HTTP handlers and routing for the shortener REST API.
//!
//! # Endpoints
//! - `POST /create` - Create a short key for a long URL
//! - `GET /:key` - Redirect to the long URL
//! - `GET /:key/summary` - Usage statistics for a key
//! - `DELETE /:key` - Delete a key
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

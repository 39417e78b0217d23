//! API Routes
//!
//! Configures the Axum router with all shortener endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, delete_handler, health_handler, resolve_handler, summary_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /create` - Create a short key for a long URL
/// - `GET /:key` - Redirect to the long URL (counts as a resolution)
/// - `GET /:key/summary` - Usage statistics for a key
/// - `DELETE /:key` - Delete a key
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints. Static routes take precedence over
    // the `/:key` captures.
    Router::new()
        .route("/create", post(create_handler))
        .route("/health", get(health_handler))
        .route("/:key", get(resolve_handler).delete(delete_handler))
        .route("/:key/summary", get(summary_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

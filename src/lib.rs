//! Shortener - A lightweight URL shortener service
//!
//! Maps long URLs to short, unguessable keys with TTL expiry, per-key usage
//! statistics, and a two-tier (cache + durable store) registry.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_tasks;

//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: evicts expired entries from the in-memory tier (seconds)
//! - Store sweep: full scan of the durable tier (minutes)

mod sweep;

pub use sweep::spawn_sweep_tasks;

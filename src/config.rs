//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache sweep interval in seconds
    pub cache_sweep_interval: u64,
    /// Store sweep interval in seconds (a full scan, keep it long)
    pub store_sweep_interval: u64,
    /// Directory holding the durable store
    pub data_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3030)
    /// - `CACHE_SWEEP_INTERVAL` - Cache sweep frequency in seconds (default: 5)
    /// - `STORE_SWEEP_INTERVAL` - Store sweep frequency in seconds (default: 60)
    /// - `DATA_DIR` - Durable store directory (default: "data")
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3030),
            cache_sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            store_sweep_interval: env::var("STORE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3030,
            cache_sweep_interval: 5,
            store_sweep_interval: 60,
            data_dir: PathBuf::from("data"),
        }
    }
}

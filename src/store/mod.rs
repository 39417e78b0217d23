//! Durable Store Module
//!
//! Narrow key-value capability consumed by the registry. Backends have been
//! swapped historically, so everything the registry needs is expressed by
//! the [`EntryStore`] trait: get/put/delete plus a snapshot iteration used
//! only by the store sweep.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

// == Store Error ==
/// Failure of a durable store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("store backend failure: {0}")]
    Backend(String),

    /// Key contains characters no generated key can carry
    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

// == Entry Store Trait ==
/// Durable key-value tier for serialized entries.
///
/// Implementations provide their own internal synchronization for individual
/// key operations; no cross-key atomicity is assumed. Keys are URL-safe
/// strings by construction of the key generator.
pub trait EntryStore: Send + Sync {
    /// Reads the record stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes (or overwrites) the record under `key`.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Removes the record under `key`, reporting whether it was present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns a snapshot of all records. Used only by the store sweep;
    /// writes made while the snapshot is taken need not be reflected.
    fn iterate(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
}

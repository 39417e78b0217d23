//! File Store Backend
//!
//! Durable [`EntryStore`] keeping one file per key under a data directory.
//! Short keys are URL-safe base64, so they are always valid file names.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::store::{EntryStore, StoreError};

// == File Store ==
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    // == Constructor ==
    /// Opens (creating if needed) the data directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Maps a key onto its file path. Keys that could escape the store root
    /// (path separators, `..`, anything outside the generator's URL-safe
    /// alphabet) are refused before any path is formed.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let well_formed = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !well_formed {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl EntryStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        fs::write(self.path_for(key)?, bytes)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn iterate(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut records = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let Ok(key) = dir_entry.file_name().into_string() else {
                continue;
            };
            match fs::read(dir_entry.path()) {
                Ok(bytes) => records.push((key, bytes)),
                // Deleted between listing and read; skip it.
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(records)
    }
}

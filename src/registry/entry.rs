//! Entry Module
//!
//! Defines one short-key record: immutable identity plus expiry and usage
//! state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::counter::UsageCounter;
use crate::registry::DEFAULT_TTL_DAYS;

// == Entry ==
/// One short-key-to-URL record.
///
/// `key`, `long_url` and `created_at` are fixed at creation; the usage
/// counter is the only state mutated afterwards. `expires_at` of `None`
/// means the entry never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Globally unique short key
    pub key: String,
    /// The original long-form URL
    pub long_url: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp; None = never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Per-entry resolution counter
    pub usage: UsageCounter,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry whose expiry is derived from `ttl_secs`:
    /// `0` expires one year out, negative is already expired at creation,
    /// positive is seconds from now.
    pub fn new(key: String, long_url: String, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            key,
            long_url,
            created_at: now,
            expires_at: expiry_for_ttl(now, ttl_secs),
            usage: UsageCounter::new(),
        }
    }

    // == Is Expired ==
    /// True when the entry carries an expiry and `now` has reached it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }

    // == Serialization ==
    /// Serializes the entry to its durable-store record form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Reconstructs an entry from a durable-store record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

// == Expiry Policy ==
/// Maps a ttl in whole seconds onto an expiry timestamp.
pub fn expiry_for_ttl(now: DateTime<Utc>, ttl_secs: i64) -> Option<DateTime<Utc>> {
    match ttl_secs {
        0 => Some(now + Duration::days(DEFAULT_TTL_DAYS)),
        t if t < 0 => Some(now),
        t => Some(now + Duration::seconds(t)),
    }
}

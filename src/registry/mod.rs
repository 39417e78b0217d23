//! Registry Module
//!
//! The core of the shortener: collision-free key generation, a two-tier
//! entry registry (in-memory cache over a durable store), lazy expiry and
//! background sweeps, and per-entry usage counting.

mod counter;
mod entry;
mod keygen;
mod manager;


// Re-export public types
pub use counter::{UsageCounter, UsageSummary};
pub use entry::Entry;
pub use keygen::KeyGenerator;
pub use manager::Registry;

// == Public Constants ==
/// Maximum allowed long-URL length in bytes
pub const MAX_URL_LENGTH: usize = 8192;

/// Key generation attempts before a create call gives up
pub const MAX_KEY_ATTEMPTS: usize = 10;

/// Lifetime, in days, of an entry created with a zero ttl
pub const DEFAULT_TTL_DAYS: i64 = 365;

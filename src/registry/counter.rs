//! Usage Counter Module
//!
//! Tracks per-entry resolution counts bucketed by calendar day.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// == Usage Counter ==
/// Per-entry call counter, one bucket per calendar date.
///
/// The bucket map grows without bound over the lifetime of an entry; this is
/// a known limitation accepted in exchange for exact day/week/total reporting.
///
/// An internal read/write lock makes `record_call` and `summary` safe to call
/// concurrently on a shared counter: every call recorded before `summary`
/// returns is reflected in its output, and concurrent increments are never
/// lost.
#[derive(Debug, Default)]
pub struct UsageCounter {
    /// Calls per calendar date
    buckets: RwLock<HashMap<NaiveDate, u64>>,
}

// == Usage Summary ==
/// Aggregated call counts for one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    /// Calls recorded on today's date
    pub day_calls: u64,
    /// Calls recorded within the trailing 7 days
    pub week_calls: u64,
    /// Calls recorded since creation
    pub total_calls: u64,
}

impl UsageCounter {
    // == Constructor ==
    /// Creates a counter with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Call ==
    /// Increments the bucket for `timestamp`'s calendar date, creating the
    /// bucket if absent. Never fails.
    pub fn record_call(&self, timestamp: DateTime<Utc>) {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        *buckets.entry(timestamp.date_naive()).or_insert(0) += 1;
    }

    // == Summary ==
    /// Reports day/week/total call counts as of `now`.
    ///
    /// A bucket counts toward the week when its midnight-aligned timestamp
    /// `m` satisfies `m < now && m > now - 7 days`. Today's bucket therefore
    /// counts toward both day and week; a bucket exactly seven days old
    /// counts only toward the total.
    pub fn summary(&self, now: DateTime<Utc>) -> UsageSummary {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        let today = now.date_naive();
        let week_floor = now - Duration::days(7);

        let mut summary = UsageSummary::default();
        for (date, count) in buckets.iter() {
            summary.total_calls += count;

            if *date == today {
                summary.day_calls += count;
            }

            let midnight = date.and_time(NaiveTime::MIN).and_utc();
            if midnight < now && midnight > week_floor {
                summary.week_calls += count;
            }
        }

        summary
    }
}

// == Clone / Serde ==
// Derives cannot see through the interior lock, so Clone and the serde pair
// operate on a snapshot of the bucket map. Bucket ordering is not preserved
// across a round trip.
impl Clone for UsageCounter {
    fn clone(&self) -> Self {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        Self {
            buckets: RwLock::new(buckets.clone()),
        }
    }
}

impl Serialize for UsageCounter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UsageCounter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let buckets = HashMap::<NaiveDate, u64>::deserialize(deserializer)?;
        Ok(Self {
            buckets: RwLock::new(buckets),
        })
    }
}

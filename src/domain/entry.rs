//! Cache entries and their derived freshness.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::recommendation::Recommendation;
use super::snapshot::PriceSnapshot;
use super::symbol::Symbol;

/// Default validity window for a cached recommendation.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Last-known-good recommendation for one symbol.
///
/// Validity is never stored; it is recomputed from `fetched_at` and
/// `ttl_secs` against the caller's notion of "now".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub symbol: Symbol,
    pub payload: Recommendation,
    pub snapshot: PriceSnapshot,
    pub fetched_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

/// Whole seconds as a chrono duration, clamped to what chrono can represent.
#[must_use]
pub fn secs_duration(secs: u64) -> Duration {
    const MAX_SECS: i64 = i64::MAX / 1_000;
    Duration::seconds(i64::try_from(secs).map_or(MAX_SECS, |s| s.min(MAX_SECS)))
}

impl CacheEntry {
    fn ttl(&self) -> Duration {
        secs_duration(self.ttl_secs)
    }

    /// When the entry stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.fetched_at
            .checked_add_signed(self.ttl())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Time since the entry was populated. Negative if the clock went backwards.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Valid iff `now - fetched_at < ttl`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.age(now) < self.ttl()
    }

    /// Whole seconds of validity left, rounded up; zero once expired.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let left_ms = (self.ttl() - self.age(now)).num_milliseconds();
        if left_ms <= 0 {
            return 0;
        }
        u64::try_from(left_ms).map_or(0, |ms| ms.div_ceil(1_000))
    }
}

/// Counts over the whole cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_records: usize,
    pub valid_records: usize,
    pub expired_records: usize,
    pub ttl_secs: u64,
}

/// Epoch seconds with sub-second precision, the persisted form of timestamps.
#[must_use]
pub fn to_epoch_secs(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Inverse of [`to_epoch_secs`]. Returns `None` for non-finite or out-of-range input.
#[must_use]
pub fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64)
}

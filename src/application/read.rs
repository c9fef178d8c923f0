//! Read path for request handlers.
//!
//! Reads never call the provider. An entry past its TTL is still returned,
//! marked stale, until a refresh replaces it or the sweep removes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::cache::CacheStore;
use crate::domain::{HistoryRecord, PriceSnapshot, Recommendation, Symbol};

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    History,
}

/// A recommendation as served to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub symbol: Symbol,
    pub payload: Recommendation,
    pub snapshot: PriceSnapshot,
    pub fetched_at: DateTime<Utc>,
    pub remaining_secs: u64,
    /// Whether the entry is still within its TTL.
    pub fresh: bool,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Available(Reading),
    NotAvailable,
}

impl ReadOutcome {
    #[must_use]
    pub fn into_reading(self) -> Option<Reading> {
        match self {
            Self::Available(reading) => Some(reading),
            Self::NotAvailable => None,
        }
    }
}

/// Serves cached recommendations.
pub struct Reader {
    cache: Arc<CacheStore>,
}

impl Reader {
    #[must_use]
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Current entry for `symbol`, fresh or stale.
    ///
    /// Store failures are logged and reported as [`ReadOutcome::NotAvailable`].
    #[must_use]
    pub fn read(&self, symbol: &Symbol) -> ReadOutcome {
        match self.cache.get(symbol) {
            Ok(Some(cached)) => {
                let fresh = cached.is_valid();
                let entry = cached.entry;
                ReadOutcome::Available(Reading {
                    symbol: entry.symbol,
                    payload: entry.payload,
                    snapshot: entry.snapshot,
                    fetched_at: entry.fetched_at,
                    remaining_secs: cached.remaining_secs,
                    fresh,
                    source: Source::Cache,
                })
            }
            Ok(None) => ReadOutcome::NotAvailable,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Cache read failed");
                ReadOutcome::NotAvailable
            }
        }
    }

    /// Like [`read`](Self::read), falling back to the newest history record
    /// fetched within `window` when there is no cache entry.
    #[must_use]
    pub fn read_or_recent(&self, symbol: &Symbol, window: Duration) -> ReadOutcome {
        if let ReadOutcome::Available(reading) = self.read(symbol) {
            return ReadOutcome::Available(reading);
        }
        match self.cache.latest_history_within(symbol, window) {
            Ok(Some(record)) => ReadOutcome::Available(from_history(record)),
            Ok(None) => ReadOutcome::NotAvailable,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "History read failed");
                ReadOutcome::NotAvailable
            }
        }
    }
}

fn from_history(record: HistoryRecord) -> Reading {
    Reading {
        symbol: record.symbol,
        payload: record.payload,
        snapshot: record.snapshot,
        fetched_at: record.fetched_at,
        remaining_secs: 0,
        fresh: false,
        source: Source::History,
    }
}

//! Persistence port for cached recommendations, their history and the
//! market samples taken at refresh time.
//!
//! Rows cross this boundary in their persisted shape (JSON text and epoch
//! seconds). Decoding happens in the cache layer so that a row which no
//! longer decodes can be detected and removed there.

use crate::domain::Symbol;
use crate::error::Result;

/// One persisted cache row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub symbol: String,
    /// Serialized [`Recommendation`](crate::domain::Recommendation).
    pub payload: String,
    /// Serialized [`PriceSnapshot`](crate::domain::PriceSnapshot).
    pub snapshot: String,
    /// Epoch seconds.
    pub fetched_at: f64,
    pub ttl_secs: i64,
}

/// One persisted history row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredHistory {
    pub id: i64,
    pub symbol: String,
    pub payload: String,
    pub snapshot: String,
    pub fetched_at: f64,
    pub hit: Option<bool>,
    pub pnl: Option<f64>,
}

/// One persisted market sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSample {
    pub symbol: String,
    pub price: f64,
    pub funding_rate: Option<f64>,
    /// Epoch seconds.
    pub recorded_at: f64,
}

/// Storage operations behind the cache store.
///
/// Methods are synchronous: implementations are either in-process or a
/// pooled SQLite connection, and callers hold per-symbol locks across them.
/// Every mutation is atomic on its own.
pub trait RecommendationStore: Send + Sync {
    /// Replace the cache row for `entry.symbol` and append a history row in
    /// one transaction, then trim history to the newest `history_limit` rows.
    ///
    /// Returns the id of the appended history row.
    fn upsert(&self, entry: &StoredEntry, history_limit: usize) -> Result<i64>;

    fn get(&self, symbol: &Symbol) -> Result<Option<StoredEntry>>;

    /// All cache rows, ordered by symbol.
    fn list(&self) -> Result<Vec<StoredEntry>>;

    /// Returns whether a row was removed.
    fn delete(&self, symbol: &Symbol) -> Result<bool>;

    /// Delete the row only if it still carries `fetched_at`.
    ///
    /// Guards self-healing deletes against removing a row that a concurrent
    /// refresh has just replaced.
    fn delete_if_fetched_at(&self, symbol: &Symbol, fetched_at: f64) -> Result<bool>;

    /// Remove every cache row. History is kept.
    fn clear(&self) -> Result<usize>;

    /// Remove cache rows with `fetched_at < cutoff`.
    fn delete_older_than(&self, cutoff: f64) -> Result<usize>;

    /// History rows newest first, optionally for one symbol.
    fn history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>>;

    /// Newest history row for `symbol` with `fetched_at >= since`.
    fn latest_history_since(&self, symbol: &Symbol, since: f64) -> Result<Option<StoredHistory>>;

    /// Record whether a past recommendation hit. Returns `false` for an unknown id.
    fn mark_outcome(&self, id: i64, hit: bool, pnl: Option<f64>) -> Result<bool>;

    /// Marked history rows newest first, optionally for one symbol.
    fn marked_history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>>;

    /// Distinct symbols that appear in history.
    fn history_symbols(&self) -> Result<Vec<String>>;

    /// Append a market sample and drop every sample recorded before
    /// `cutoff`, in one transaction. Returns the number dropped.
    fn record_sample(&self, sample: &StoredSample, cutoff: f64) -> Result<usize>;

    /// Samples for `symbol` with `recorded_at >= since`, newest first.
    fn samples_since(&self, symbol: &Symbol, since: f64) -> Result<Vec<StoredSample>>;
}

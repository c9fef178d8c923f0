//! TTL-aware recommendation cache over a persistent store.
//!
//! Validity is derived from `fetched_at` on every read. Mutations of one
//! symbol are serialized through a per-symbol lock; different symbols never
//! wait on each other. A row that no longer decodes is removed on read and
//! reported as absent. Market samples recorded at refresh time are kept
//! for a fixed number of days and summarized on demand.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::analytics::DEFAULT_MARKET_RETENTION_DAYS;
use crate::domain::entry::{from_epoch_secs, secs_duration, to_epoch_secs, DEFAULT_TTL_SECS};
use crate::domain::history::DEFAULT_HISTORY_LIMIT;
use crate::domain::{
    CacheEntry, CacheStats, HistoryRecord, MarketAnalytics, MarketContext, MarketSample, Outcome,
    PriceSnapshot, Recommendation, Symbol, WinRate,
};
use crate::error::Result;
use crate::port::outbound::clock::Clock;
use crate::port::outbound::store::{RecommendationStore, StoredEntry, StoredHistory, StoredSample};

/// Cache sizing and retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl_secs: u64,
    /// Entries older than `retention_multiple * ttl` are swept.
    pub retention_multiple: u32,
    pub history_limit: usize,
    /// Market samples older than this many days are dropped.
    pub market_retention_days: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            retention_multiple: 12,
            history_limit: DEFAULT_HISTORY_LIMIT,
            market_retention_days: DEFAULT_MARKET_RETENTION_DAYS,
        }
    }
}

/// A cache hit with its freshness at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    pub entry: CacheEntry,
    /// Whole seconds until expiry, zero once stale.
    pub remaining_secs: u64,
}

impl Cached {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.remaining_secs > 0
    }
}

/// Persistent, TTL-aware mapping from symbol to last known good recommendation.
pub struct CacheStore {
    store: Arc<dyn RecommendationStore>,
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
    locks: DashMap<Symbol, Arc<Mutex<()>>>,
}

impl CacheStore {
    #[must_use]
    pub fn new(store: Arc<dyn RecommendationStore>, clock: Arc<dyn Clock>, policy: CachePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock_for(&self, symbol: &Symbol) -> Arc<Mutex<()>> {
        self.locks.entry(symbol.clone()).or_default().clone()
    }

    /// Replace the entry for `symbol` with a freshly fetched one and append
    /// it to history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails; the previous entry is then
    /// left untouched.
    pub fn upsert(
        &self,
        symbol: &Symbol,
        payload: &Recommendation,
        snapshot: &PriceSnapshot,
    ) -> Result<CacheEntry> {
        let entry = CacheEntry {
            symbol: symbol.clone(),
            payload: payload.clone(),
            snapshot: snapshot.clone(),
            fetched_at: self.clock.now(),
            ttl_secs: self.policy.ttl_secs,
        };
        let row = StoredEntry {
            symbol: symbol.to_string(),
            payload: serde_json::to_string(payload)?,
            snapshot: serde_json::to_string(snapshot)?,
            fetched_at: to_epoch_secs(entry.fetched_at),
            ttl_secs: i64::try_from(entry.ttl_secs).unwrap_or(i64::MAX),
        };

        let lock = self.lock_for(symbol);
        let _guard = lock.lock();
        let history_id = self.store.upsert(&row, self.policy.history_limit)?;
        debug!(symbol = %symbol, history_id, "Cache entry stored");
        Ok(entry)
    }

    /// Look up `symbol`, valid or stale. Never triggers a fetch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails. Undecodable rows
    /// are deleted and reported as `None`.
    pub fn get(&self, symbol: &Symbol) -> Result<Option<Cached>> {
        let Some(row) = self.store.get(symbol)? else {
            return Ok(None);
        };
        match decode_entry(&row) {
            Some(entry) => Ok(Some(self.annotate(entry))),
            None => {
                self.heal(symbol, row.fetched_at);
                Ok(None)
            }
        }
    }

    /// Whether `symbol` has an entry that is still within its TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn is_valid(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.get(symbol)?.is_some_and(|c| c.is_valid()))
    }

    /// Every valid entry, ordered by symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn all_valid(&self) -> Result<Vec<Cached>> {
        let mut valid = Vec::new();
        for row in self.store.list()? {
            match decode_entry(&row) {
                Some(entry) => {
                    let cached = self.annotate(entry);
                    if cached.is_valid() {
                        valid.push(cached);
                    }
                }
                None => {
                    if let Ok(symbol) = Symbol::try_new(&row.symbol) {
                        self.heal(&symbol, row.fetched_at);
                    }
                }
            }
        }
        Ok(valid)
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn delete(&self, symbol: &Symbol) -> Result<bool> {
        let lock = self.lock_for(symbol);
        let _guard = lock.lock();
        self.store.delete(symbol)
    }

    /// Remove every cache entry. History is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear_all(&self) -> Result<usize> {
        let removed = self.store.clear()?;
        info!(removed, "Cache cleared");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn stats(&self) -> Result<CacheStats> {
        let now = self.clock.now();
        let rows = self.store.list()?;
        let valid_records = rows
            .iter()
            .filter_map(stamp)
            .filter(|(fetched_at, ttl_secs)| is_fresh(*fetched_at, *ttl_secs, now))
            .count();
        Ok(CacheStats {
            total_records: rows.len(),
            valid_records,
            expired_records: rows.len() - valid_records,
            ttl_secs: self.policy.ttl_secs,
        })
    }

    /// Delete entries older than `retention_multiple * ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn sweep(&self) -> Result<usize> {
        let retention = self.policy.ttl_secs.saturating_mul(u64::from(self.policy.retention_multiple));
        let retention = secs_duration(retention);
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self.store.delete_older_than(to_epoch_secs(cutoff))?;
        if removed > 0 {
            info!(removed, "Swept expired cache entries");
        }
        Ok(removed)
    }

    /// History newest first. Rows that no longer decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .store
            .history(symbol, limit)?
            .into_iter()
            .filter_map(decode_history)
            .collect())
    }

    /// Newest history record for `symbol` fetched within `window` of now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn latest_history_within(
        &self,
        symbol: &Symbol,
        window: std::time::Duration,
    ) -> Result<Option<HistoryRecord>> {
        let window = ChronoDuration::from_std(window).unwrap_or_else(|_| secs_duration(u64::MAX));
        let since = self
            .clock
            .now()
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Ok(self
            .store
            .latest_history_since(symbol, to_epoch_secs(since))?
            .and_then(decode_history))
    }

    /// Record the outcome of history row `id`. Returns `false` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn mark_outcome(&self, id: i64, outcome: Outcome) -> Result<bool> {
        let pnl = outcome.pnl.and_then(|p| p.to_f64());
        self.store.mark_outcome(id, outcome.hit, pnl)
    }

    /// Hit rate over the newest `limit` marked recommendations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn win_rate(&self, symbol: Option<&Symbol>, limit: usize) -> Result<WinRate> {
        let outcomes: Vec<Outcome> = self
            .store
            .marked_history(symbol, limit)?
            .into_iter()
            .filter_map(|row| {
                Some(Outcome {
                    hit: row.hit?,
                    pnl: row.pnl.and_then(Decimal::from_f64).map(|p| p.round_dp(8)),
                })
            })
            .collect();
        Ok(WinRate::from_outcomes(&outcomes))
    }

    /// Symbols that have history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn history_symbols(&self) -> Result<Vec<Symbol>> {
        Ok(self
            .store
            .history_symbols()?
            .into_iter()
            .filter_map(|s| Symbol::try_new(s).ok())
            .collect())
    }

    /// Record the market state a refresh started from. Samples past the
    /// retention window are dropped in the same write.
    ///
    /// Returns the number of samples dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn record_market(&self, symbol: &Symbol, context: &MarketContext) -> Result<usize> {
        let Some(price) = context.snapshot.current_price.to_f64() else {
            debug!(symbol = %symbol, "Price not representable, sample skipped");
            return Ok(0);
        };
        let now = self.clock.now();
        let sample = StoredSample {
            symbol: symbol.to_string(),
            price,
            funding_rate: context.funding_rate.and_then(|r| r.to_f64()),
            recorded_at: to_epoch_secs(now),
        };
        let cutoff = days_before(now, self.policy.market_retention_days);
        let dropped = self.store.record_sample(&sample, to_epoch_secs(cutoff))?;
        if dropped > 0 {
            debug!(symbol = %symbol, dropped, "Dropped market samples past retention");
        }
        Ok(dropped)
    }

    /// Price and funding aggregates over the last `window_days` days of
    /// samples for `symbol`. `None` if nothing was recorded in the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn market_analytics(&self, symbol: &Symbol, window_days: u32) -> Result<Option<MarketAnalytics>> {
        let since = days_before(self.clock.now(), window_days);
        let samples: Vec<MarketSample> = self
            .store
            .samples_since(symbol, to_epoch_secs(since))?
            .into_iter()
            .filter_map(decode_sample)
            .collect();
        Ok(MarketAnalytics::from_samples(symbol.clone(), window_days, &samples))
    }

    fn annotate(&self, entry: CacheEntry) -> Cached {
        let remaining_secs = entry.remaining_secs(self.clock.now());
        Cached {
            entry,
            remaining_secs,
        }
    }

    /// Delete a corrupt row unless a refresh has replaced it since it was read.
    fn heal(&self, symbol: &Symbol, fetched_at: f64) {
        let lock = self.lock_for(symbol);
        let _guard = lock.lock();
        match self.store.delete_if_fetched_at(symbol, fetched_at) {
            Ok(true) => warn!(symbol = %symbol, "Deleted corrupt cache entry"),
            Ok(false) => debug!(symbol = %symbol, "Corrupt cache entry already replaced"),
            Err(e) => warn!(symbol = %symbol, error = %e, "Failed to delete corrupt cache entry"),
        }
    }
}

fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(ChronoDuration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn decode_sample(row: StoredSample) -> Option<MarketSample> {
    Some(MarketSample {
        symbol: Symbol::try_new(&row.symbol).ok()?,
        price: Decimal::from_f64(row.price)?.round_dp(8),
        funding_rate: row.funding_rate.and_then(Decimal::from_f64).map(|r| r.round_dp(8)),
        recorded_at: from_epoch_secs(row.recorded_at)?,
    })
}

fn stamp(row: &StoredEntry) -> Option<(DateTime<Utc>, u64)> {
    Some((from_epoch_secs(row.fetched_at)?, u64::try_from(row.ttl_secs).ok()?))
}

fn is_fresh(fetched_at: DateTime<Utc>, ttl_secs: u64, now: DateTime<Utc>) -> bool {
    now - fetched_at < secs_duration(ttl_secs)
}

fn decode_entry(row: &StoredEntry) -> Option<CacheEntry> {
    let (fetched_at, ttl_secs) = stamp(row)?;
    Some(CacheEntry {
        symbol: Symbol::try_new(&row.symbol).ok()?,
        payload: serde_json::from_str(&row.payload).ok()?,
        snapshot: serde_json::from_str(&row.snapshot).ok()?,
        fetched_at,
        ttl_secs,
    })
}

fn decode_history(row: StoredHistory) -> Option<HistoryRecord> {
    let decoded = try_decode_history(&row);
    if decoded.is_none() {
        debug!(id = row.id, symbol = %row.symbol, "Skipping undecodable history row");
    }
    decoded
}

fn try_decode_history(row: &StoredHistory) -> Option<HistoryRecord> {
    Some(HistoryRecord {
        id: row.id,
        symbol: Symbol::try_new(&row.symbol).ok()?,
        payload: serde_json::from_str(&row.payload).ok()?,
        snapshot: serde_json::from_str(&row.snapshot).ok()?,
        fetched_at: from_epoch_secs(row.fetched_at)?,
        outcome: row.hit.map(|hit| Outcome {
            hit,
            pnl: row.pnl.and_then(Decimal::from_f64).map(|p| p.round_dp(8)),
        }),
    })
}

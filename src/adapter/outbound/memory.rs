//! In-memory recommendation store for tests and ephemeral runs.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::Symbol;
use crate::error::Result;
use crate::port::outbound::store::{RecommendationStore, StoredEntry, StoredHistory, StoredSample};

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, StoredEntry>,
    /// Oldest first.
    history: Vec<StoredHistory>,
    next_id: i64,
    /// Oldest first.
    samples: Vec<StoredSample>,
}

/// In-memory store. One lock covers cache and history so an upsert is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<'a>(
    rows: impl DoubleEndedIterator<Item = &'a StoredHistory>,
    symbol: Option<&Symbol>,
    limit: usize,
) -> Vec<StoredHistory> {
    rows.rev()
        .filter(|h| symbol.map_or(true, |s| h.symbol == s.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

impl RecommendationStore for MemoryStore {
    fn upsert(&self, entry: &StoredEntry, history_limit: usize) -> Result<i64> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.insert(entry.symbol.clone(), entry.clone());
        inner.history.push(StoredHistory {
            id,
            symbol: entry.symbol.clone(),
            payload: entry.payload.clone(),
            snapshot: entry.snapshot.clone(),
            fetched_at: entry.fetched_at,
            hit: None,
            pnl: None,
        });
        let excess = inner.history.len().saturating_sub(history_limit);
        inner.history.drain(..excess);
        Ok(id)
    }

    fn get(&self, symbol: &Symbol) -> Result<Option<StoredEntry>> {
        Ok(self.inner.read().entries.get(symbol.as_str()).cloned())
    }

    fn list(&self) -> Result<Vec<StoredEntry>> {
        Ok(self.inner.read().entries.values().cloned().collect())
    }

    fn delete(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.inner.write().entries.remove(symbol.as_str()).is_some())
    }

    fn delete_if_fetched_at(&self, symbol: &Symbol, fetched_at: f64) -> Result<bool> {
        let mut inner = self.inner.write();
        let same_row = inner
            .entries
            .get(symbol.as_str())
            .is_some_and(|e| e.fetched_at == fetched_at);
        if same_row {
            inner.entries.remove(symbol.as_str());
        }
        Ok(same_row)
    }

    fn clear(&self) -> Result<usize> {
        let mut inner = self.inner.write();
        let removed = inner.entries.len();
        inner.entries.clear();
        Ok(removed)
    }

    fn delete_older_than(&self, cutoff: f64) -> Result<usize> {
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.fetched_at >= cutoff);
        Ok(before - inner.entries.len())
    }

    fn history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>> {
        Ok(newest_first(self.inner.read().history.iter(), symbol, limit))
    }

    fn latest_history_since(&self, symbol: &Symbol, since: f64) -> Result<Option<StoredHistory>> {
        let inner = self.inner.read();
        Ok(inner
            .history
            .iter()
            .rev()
            .find(|h| h.symbol == symbol.as_str() && h.fetched_at >= since)
            .cloned())
    }

    fn mark_outcome(&self, id: i64, hit: bool, pnl: Option<f64>) -> Result<bool> {
        let mut inner = self.inner.write();
        match inner.history.iter_mut().find(|h| h.id == id) {
            Some(row) => {
                row.hit = Some(hit);
                row.pnl = pnl;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn marked_history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>> {
        let inner = self.inner.read();
        Ok(newest_first(
            inner.history.iter().filter(|h| h.hit.is_some()),
            symbol,
            limit,
        ))
    }

    fn history_symbols(&self) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let mut symbols: Vec<String> = inner.history.iter().map(|h| h.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn record_sample(&self, sample: &StoredSample, cutoff: f64) -> Result<usize> {
        let mut inner = self.inner.write();
        inner.samples.push(sample.clone());
        let before = inner.samples.len();
        inner.samples.retain(|s| s.recorded_at >= cutoff);
        Ok(before - inner.samples.len())
    }

    fn samples_since(&self, symbol: &Symbol, since: f64) -> Result<Vec<StoredSample>> {
        let inner = self.inner.read();
        Ok(inner
            .samples
            .iter()
            .rev()
            .filter(|s| s.symbol == symbol.as_str() && s.recorded_at >= since)
            .cloned()
            .collect())
    }
}

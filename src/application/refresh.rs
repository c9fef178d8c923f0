//! Background refresh of tracked symbols.
//!
//! Each symbol moves through a small state machine:
//!
//! ```text
//!            due (no valid entry)              success
//!   Idle ───────────────────────────▶ Fetching ─────────▶ Idle
//!    ▲                                   │
//!    │        backoff elapsed            │ failure / budget exceeded
//!    └──────────────────────────── Backoff ◀┘
//! ```
//!
//! At most one refresh per symbol is in flight. Every refresh carries a
//! generation number; a result whose generation is no longer the symbol's
//! current one is dropped instead of stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::cache::CacheStore;
use super::fetch::{Fetched, Fetcher};
use crate::domain::Symbol;
use crate::error::RefreshError;

/// Timing of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// How often due symbols are checked. Shorter than the TTL.
    pub tick: Duration,
    /// Pause after a failed refresh before the symbol is due again.
    pub backoff: Duration,
    /// How often entries past retention are swept.
    pub sweep_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(30),
            backoff: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(600),
        }
    }
}

/// Refresh state of one tracked symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolState {
    Idle,
    Fetching { generation: u64, started: Instant },
    Backoff { until: Instant },
}

/// Result of a manual [`RefreshScheduler::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    AlreadyInFlight,
    Untracked,
}

/// Handle for controlling the refresh loop lifecycle.
pub struct RefreshHandle {
    /// Channel for sending shutdown signal.
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the loop and wait for it to exit.
    ///
    /// Refreshes already in flight are detached and may still complete.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

struct Inner {
    cache: Arc<CacheStore>,
    fetcher: Arc<Fetcher>,
    policy: RefreshPolicy,
    symbols: Vec<Symbol>,
    states: DashMap<Symbol, SymbolState>,
    generation: AtomicU64,
}

/// Keeps the cache populated for a fixed set of symbols.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(
        cache: Arc<CacheStore>,
        fetcher: Arc<Fetcher>,
        symbols: Vec<Symbol>,
        policy: RefreshPolicy,
    ) -> Self {
        let mut symbols = symbols;
        symbols.sort();
        symbols.dedup();
        let states = symbols
            .iter()
            .map(|s| (s.clone(), SymbolState::Idle))
            .collect();
        Self {
            inner: Arc::new(Inner {
                cache,
                fetcher,
                policy,
                symbols,
                states,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Tracked symbols, sorted.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.inner.symbols
    }

    /// Current state of `symbol`, `None` if it is not tracked.
    #[must_use]
    pub fn state(&self, symbol: &Symbol) -> Option<SymbolState> {
        self.inner.states.get(symbol).map(|s| *s)
    }

    /// Start a refresh for every due symbol and return those started.
    ///
    /// A symbol is due when it is idle, or its backoff has elapsed, and it
    /// has no valid cache entry. Must be called within a Tokio runtime.
    pub fn tick(&self) -> Vec<Symbol> {
        let now = Instant::now();
        let mut started = Vec::new();
        for symbol in &self.inner.symbols {
            if !self.inner.ready(symbol, now) {
                continue;
            }
            match self.inner.cache.is_valid(symbol) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => warn!(symbol = %symbol, error = %e, "Cache lookup failed, treating as due"),
            }
            if let Some(generation) = self.inner.begin(symbol, false) {
                self.spawn_refresh(symbol.clone(), generation);
                started.push(symbol.clone());
            }
        }
        if !started.is_empty() {
            debug!(count = started.len(), "Refreshes started");
        }
        started
    }

    /// Refresh `symbol` now, regardless of cache validity or backoff.
    ///
    /// Must be called within a Tokio runtime.
    pub fn trigger(&self, symbol: &Symbol) -> TriggerOutcome {
        if !self.inner.states.contains_key(symbol) {
            return TriggerOutcome::Untracked;
        }
        match self.inner.begin(symbol, true) {
            Some(generation) => {
                info!(symbol = %symbol, generation, "Manual refresh triggered");
                self.spawn_refresh(symbol.clone(), generation);
                TriggerOutcome::Started
            }
            None => TriggerOutcome::AlreadyInFlight,
        }
    }

    /// Run the refresh loop until the returned handle is shut down.
    ///
    /// The first tick fires immediately, so symbols without an entry are
    /// fetched at startup.
    #[must_use]
    pub fn start(&self) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let scheduler = self.clone();
        let policy = self.inner.policy;

        let task = tokio::spawn(async move {
            let mut ticks = interval(policy.tick);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sweeps = interval_at(Instant::now() + policy.sweep_interval, policy.sweep_interval);
            sweeps.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                symbols = scheduler.inner.symbols.len(),
                tick_secs = policy.tick.as_secs(),
                "Refresh scheduler started"
            );

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Refresh scheduler shutting down");
                        break;
                    }

                    _ = ticks.tick() => {
                        scheduler.tick();
                    }

                    _ = sweeps.tick() => {
                        if let Err(e) = scheduler.inner.cache.sweep() {
                            warn!(error = %e, "Retention sweep failed");
                        }
                    }
                }
            }
        });

        RefreshHandle { shutdown_tx, task }
    }

    fn spawn_refresh(&self, symbol: Symbol, generation: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.run(&symbol).await;
            inner.complete(&symbol, generation, result);
        });
    }
}

impl Inner {
    /// Whether `symbol` may start a scheduled refresh. Also abandons
    /// refreshes that outlived their budget.
    fn ready(&self, symbol: &Symbol, now: Instant) -> bool {
        let Some(mut state) = self.states.get_mut(symbol) else {
            return false;
        };
        match *state {
            SymbolState::Idle => true,
            SymbolState::Backoff { until } => now >= until,
            SymbolState::Fetching { generation, started } => {
                let limit = self.fetcher.policy().refresh_budget() + self.policy.tick;
                if now.duration_since(started) > limit {
                    warn!(symbol = %symbol, generation, "Refresh overran its budget, abandoning");
                    *state = SymbolState::Backoff {
                        until: now + self.policy.backoff,
                    };
                }
                false
            }
        }
    }

    /// Move `symbol` to `Fetching` unless a refresh is already in flight.
    /// Backoff is honored unless `force` is set.
    fn begin(&self, symbol: &Symbol, force: bool) -> Option<u64> {
        let now = Instant::now();
        let mut state = self.states.get_mut(symbol)?;
        match *state {
            SymbolState::Fetching { .. } => return None,
            SymbolState::Backoff { until } if !force && now < until => return None,
            _ => {}
        }
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        *state = SymbolState::Fetching {
            generation,
            started: now,
        };
        Some(generation)
    }

    /// Bounded by the refresh budget, so every provider attempt gets its
    /// full timeout even after slow market requests.
    async fn run(&self, symbol: &Symbol) -> Result<Fetched, RefreshError> {
        let budget = self.fetcher.policy().refresh_budget();
        match timeout(budget, self.fetcher.fetch_with_retry(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(RefreshError::BudgetExceeded {
                symbol: symbol.to_string(),
                budget,
            }),
        }
    }

    fn is_current(&self, symbol: &Symbol, generation: u64) -> bool {
        self.states
            .get(symbol)
            .is_some_and(|state| in_flight(&state, generation))
    }

    /// Store the result of refresh `generation` and settle the symbol's state.
    ///
    /// No state guard is held while the cache is written; the generation is
    /// checked again before the state changes.
    fn complete(&self, symbol: &Symbol, generation: u64, result: Result<Fetched, RefreshError>) {
        if !self.is_current(symbol, generation) {
            debug!(symbol = %symbol, generation, "Discarding result of superseded refresh");
            return;
        }

        let stored = match result {
            Ok(fetched) => match self
                .cache
                .upsert(symbol, &fetched.recommendation, &fetched.snapshot)
            {
                Ok(_) => {
                    info!(
                        symbol = %symbol,
                        generation,
                        attempts = fetched.attempts,
                        "Recommendation refreshed"
                    );
                    true
                }
                Err(e) => {
                    error!(symbol = %symbol, generation, error = %e, "Failed to store recommendation");
                    false
                }
            },
            Err(e @ RefreshError::NonRetryable { .. }) => {
                error!(symbol = %symbol, generation, error = %e, "Provider refused the request");
                false
            }
            Err(e) => {
                warn!(symbol = %symbol, generation, error = %e, "Refresh failed, backing off");
                false
            }
        };

        let Some(mut state) = self.states.get_mut(symbol) else {
            return;
        };
        if !in_flight(&state, generation) {
            debug!(symbol = %symbol, generation, "Refresh superseded while storing");
            return;
        }
        *state = if stored {
            SymbolState::Idle
        } else {
            SymbolState::Backoff {
                until: Instant::now() + self.policy.backoff,
            }
        };
    }
}

fn in_flight(state: &SymbolState, generation: u64) -> bool {
    matches!(*state, SymbolState::Fetching { generation: g, .. } if g == generation)
}

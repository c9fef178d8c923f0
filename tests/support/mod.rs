#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tradewise::adapter::outbound::memory::MemoryStore;
use tradewise::application::cache::{CachePolicy, CacheStore};
use tradewise::application::fetch::{FetchPolicy, Fetcher};
use tradewise::application::refresh::{RefreshPolicy, RefreshScheduler};
use tradewise::domain::Symbol;
use tradewise::testkit::clock::ManualClock;
use tradewise::testkit::llm::ScriptedLlm;
use tradewise::testkit::market::StaticMarket;

pub fn symbol(raw: &str) -> Symbol {
    Symbol::try_new(raw).expect("valid symbol")
}

pub fn btc() -> Symbol {
    symbol("BTCUSDT")
}

/// In-memory cache on a manual clock.
pub fn memory_cache(ttl_secs: u64) -> (Arc<CacheStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(CacheStore::new(
        Arc::new(MemoryStore::new()),
        clock.clone(),
        CachePolicy {
            ttl_secs,
            ..CachePolicy::default()
        },
    ));
    (cache, clock)
}

/// Attempts that time out after 2s with no pause between them.
pub fn fast_fetch_policy() -> FetchPolicy {
    FetchPolicy {
        max_attempts: 3,
        attempt_timeout: Duration::from_secs(2),
        retry_delay: Duration::ZERO,
        market_timeout: Duration::from_secs(1),
    }
}

pub fn refresh_policy() -> RefreshPolicy {
    RefreshPolicy {
        tick: Duration::from_secs(1),
        backoff: Duration::from_secs(3),
        sweep_interval: Duration::from_secs(60),
    }
}

pub fn scheduler(
    cache: Arc<CacheStore>,
    llm: Arc<ScriptedLlm>,
    symbols: &[&str],
) -> RefreshScheduler {
    let fetcher = Fetcher::new(llm, Arc::new(StaticMarket::default()), fast_fetch_policy());
    RefreshScheduler::new(
        cache,
        Arc::new(fetcher),
        symbols.iter().map(|s| symbol(s)).collect(),
        refresh_policy(),
    )
}

/// Let spawned tasks run. Under a paused clock this also auto-advances
/// time past any pending timers shorter than `by`.
pub async fn settle(by: Duration) {
    tokio::time::sleep(by).await;
}

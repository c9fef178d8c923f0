//! Refresh scheduler behavior: single flight, backoff and TTL expiry.

mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{btc, memory_cache, scheduler, settle, symbol};
use tradewise::application::refresh::{SymbolState, TriggerOutcome};
use tradewise::error::ProviderError;
use tradewise::testkit::fixtures::{recommendation, snapshot};
use tradewise::testkit::llm::{Reply, ScriptedLlm};

fn unavailable() -> Reply {
    Reply::Fail(ProviderError::Unavailable {
        provider: "scripted",
        status: 503,
    })
}

#[tokio::test(start_paused = true)]
async fn second_trigger_while_in_flight_is_rejected() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::new().with_delay(Duration::from_secs(1)));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    assert_eq!(scheduler.trigger(&btc()), TriggerOutcome::Started);
    assert_eq!(scheduler.trigger(&btc()), TriggerOutcome::AlreadyInFlight);
    assert!(scheduler.tick().is_empty());
    assert!(matches!(
        scheduler.state(&btc()),
        Some(SymbolState::Fetching { .. })
    ));

    settle(Duration::from_secs(2)).await;

    assert_eq!(llm.calls(), 1);
    assert_eq!(scheduler.state(&btc()), Some(SymbolState::Idle));
    assert!(cache.is_valid(&btc()).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_triggers_start_one_refresh() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::new().with_delay(Duration::from_millis(200)));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.trigger(&btc()) })
        })
        .collect();
    let mut started = 0;
    for handle in handles {
        if handle.await.unwrap() == TriggerOutcome::Started {
            started += 1;
        }
    }
    assert_eq!(started, 1);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(llm.calls(), 1);
    assert_eq!(cache.history(Some(&btc()), 10).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_entry() {
    let (cache, clock) = memory_cache(5);
    let llm = Arc::new(ScriptedLlm::always(unavailable()));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    let previous = cache.upsert(&btc(), &recommendation(), &snapshot()).unwrap();
    clock.advance(Duration::from_secs(6));

    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(100)).await;

    assert_eq!(llm.calls(), 3);
    assert!(matches!(
        scheduler.state(&btc()),
        Some(SymbolState::Backoff { .. })
    ));
    let cached = cache.get(&btc()).unwrap().expect("entry kept");
    assert_eq!(cached.entry.fetched_at, previous.fetched_at);
    assert!(!cached.is_valid());
    assert_eq!(cache.history(Some(&btc()), 10).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn entry_is_due_again_once_ttl_elapses() {
    let (cache, clock) = memory_cache(5);
    let llm = Arc::new(ScriptedLlm::new());
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(100)).await;
    assert!(cache.is_valid(&btc()).unwrap());

    assert!(scheduler.tick().is_empty());
    clock.advance(Duration::from_secs(4));
    assert!(scheduler.tick().is_empty());

    clock.advance(Duration::from_secs(2));
    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(100)).await;
    assert_eq!(llm.calls(), 2);
    assert_eq!(cache.history(Some(&btc()), 10).unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn backoff_blocks_ticks_but_not_triggers() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(
        ScriptedLlm::new()
            .then(unavailable())
            .then(unavailable())
            .then(unavailable()),
    );
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(100)).await;
    assert!(matches!(
        scheduler.state(&btc()),
        Some(SymbolState::Backoff { .. })
    ));
    assert!(scheduler.tick().is_empty());

    assert_eq!(scheduler.trigger(&btc()), TriggerOutcome::Started);
    settle(Duration::from_millis(100)).await;
    assert_eq!(scheduler.state(&btc()), Some(SymbolState::Idle));
    assert!(cache.is_valid(&btc()).unwrap());
    assert_eq!(llm.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn symbol_is_retried_after_backoff() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(
        ScriptedLlm::new()
            .then(unavailable())
            .then(unavailable())
            .then(unavailable()),
    );
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    scheduler.tick();
    settle(Duration::from_secs(2)).await;
    assert!(scheduler.tick().is_empty());

    settle(Duration::from_secs(2)).await;
    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(100)).await;
    assert!(cache.is_valid(&btc()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_ends_in_backoff() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::always(Reply::Hang));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);

    assert_eq!(scheduler.trigger(&btc()), TriggerOutcome::Started);
    settle(Duration::from_secs(7)).await;

    assert_eq!(llm.calls(), 3);
    assert!(matches!(
        scheduler.state(&btc()),
        Some(SymbolState::Backoff { .. })
    ));
    assert!(cache.get(&btc()).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn untracked_symbol_is_reported() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::new());
    let scheduler = scheduler(cache, llm.clone(), &["BTCUSDT"]);

    let eth = symbol("ETHUSDT");
    assert_eq!(scheduler.trigger(&eth), TriggerOutcome::Untracked);
    assert_eq!(scheduler.state(&eth), None);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn started_loop_fills_cache_and_shuts_down() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::new());
    let scheduler = scheduler(cache.clone(), llm.clone(), &["ETHUSDT", "BTCUSDT"]);

    let handle = scheduler.start();
    settle(Duration::from_millis(100)).await;

    assert!(cache.is_valid(&btc()).unwrap());
    assert!(cache.is_valid(&symbol("ETHUSDT")).unwrap());
    assert_eq!(llm.calls(), 2);

    settle(Duration::from_secs(5)).await;
    assert_eq!(llm.calls(), 2);

    handle.shutdown().await;
}

//! The read path never waits on, or calls, the provider.

mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{btc, memory_cache, scheduler, settle};
use tradewise::application::read::{ReadOutcome, Reader, Source};
use tradewise::application::refresh::TriggerOutcome;
use tradewise::testkit::fixtures::{recommendation, snapshot};
use tradewise::testkit::llm::{Reply, ScriptedLlm};

#[tokio::test(start_paused = true)]
async fn read_during_hanging_refresh_returns_not_available() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::always(Reply::Hang));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);
    let reader = Reader::new(cache);

    assert_eq!(scheduler.trigger(&btc()), TriggerOutcome::Started);
    settle(Duration::from_millis(10)).await;
    assert_eq!(llm.calls(), 1);

    assert_eq!(reader.read(&btc()), ReadOutcome::NotAvailable);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn read_during_hanging_refresh_serves_stale_entry() {
    let (cache, clock) = memory_cache(5);
    cache.upsert(&btc(), &recommendation(), &snapshot()).unwrap();
    clock.advance(Duration::from_secs(10));

    let llm = Arc::new(ScriptedLlm::always(Reply::Hang));
    let scheduler = scheduler(cache.clone(), llm.clone(), &["BTCUSDT"]);
    let reader = Reader::new(cache);

    assert_eq!(scheduler.tick(), vec![btc()]);
    settle(Duration::from_millis(10)).await;

    let reading = reader.read(&btc()).into_reading().expect("stale entry");
    assert!(!reading.fresh);
    assert_eq!(reading.remaining_secs, 0);
    assert_eq!(reading.source, Source::Cache);
    assert_eq!(reading.payload, recommendation());
    assert_eq!(llm.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn read_sees_refreshed_entry() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::new());
    let scheduler = scheduler(cache.clone(), llm, &["BTCUSDT"]);
    let reader = Reader::new(cache);

    assert_eq!(reader.read(&btc()), ReadOutcome::NotAvailable);
    scheduler.tick();
    settle(Duration::from_millis(10)).await;

    let reading = reader.read(&btc()).into_reading().expect("refreshed");
    assert!(reading.fresh);
    assert_eq!(reading.remaining_secs, 300);
    assert_eq!(reading.snapshot, snapshot());
}

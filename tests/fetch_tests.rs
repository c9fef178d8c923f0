//! Retry wrapper behavior against scripted providers.

mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{btc, memory_cache};
use tokio::time::Instant;
use tradewise::application::fetch::{FetchPolicy, Fetcher};
use tradewise::domain::Outcome;
use tradewise::error::{ProviderError, RefreshError};
use tradewise::testkit::fixtures::{prose_wrapped_json, recommendation, snapshot, valid_json_for};
use tradewise::testkit::llm::{Reply, ScriptedLlm};
use tradewise::testkit::market::StaticMarket;

fn fetcher(llm: &Arc<ScriptedLlm>, policy: FetchPolicy) -> Fetcher {
    Fetcher::new(llm.clone(), Arc::new(StaticMarket::default()), policy)
}

fn unavailable() -> Reply {
    Reply::Fail(ProviderError::Unavailable {
        provider: "scripted",
        status: 503,
    })
}

#[tokio::test(start_paused = true)]
async fn prose_wrapped_json_is_accepted_on_first_attempt() {
    let llm = Arc::new(ScriptedLlm::always(Reply::Text(prose_wrapped_json())));
    let fetched = fetcher(&llm, FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap();

    assert_eq!(fetched.recommendation, recommendation());
    assert_eq!(fetched.snapshot, snapshot());
    assert_eq!(fetched.attempts, 1);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn always_timing_out_provider_gets_exactly_three_attempts() {
    let llm = Arc::new(ScriptedLlm::always(Reply::Hang));
    let policy = FetchPolicy::default();
    let start = Instant::now();

    let err = fetcher(&llm, policy).fetch_with_retry(&btc()).await.unwrap_err();

    assert!(
        matches!(err, RefreshError::Exhausted { attempts: 3, .. }),
        "unexpected error: {err}"
    );
    assert_eq!(llm.calls(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= policy.total_budget(), "{elapsed:?}");
    assert!(elapsed < policy.total_budget() + Duration::from_secs(1), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failures() {
    let llm = Arc::new(
        ScriptedLlm::new()
            .then(unavailable())
            .then(Reply::Text("I cannot comply with JSON today.".into())),
    );
    let fetched = fetcher(&llm, FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap();

    assert_eq!(fetched.attempts, 3);
    assert_eq!(llm.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn invalid_answers_exhaust_attempts_with_last_reason() {
    let llm = Arc::new(ScriptedLlm::always(Reply::Text(
        r#"{"action": "enter", "direction": "up", "entry_price": 1, "stop_loss": 1, "take_profit": 1}"#
            .into(),
    )));
    let err = fetcher(&llm, FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap_err();

    match err {
        RefreshError::Exhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("direction"), "{last_error}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn answer_for_another_symbol_is_rejected() {
    let llm = Arc::new(
        ScriptedLlm::new().then(Reply::Text(valid_json_for("ETHUSDT"))),
    );
    let fetched = fetcher(&llm, FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap();
    assert_eq!(fetched.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_provider_is_not_retried() {
    let llm = Arc::new(ScriptedLlm::always(Reply::Fail(ProviderError::Unauthorized {
        provider: "scripted",
        status: 401,
    })));
    let err = fetcher(&llm, FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap_err();

    assert!(matches!(err, RefreshError::NonRetryable { .. }), "{err}");
    assert_eq!(llm.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn market_data_failure_skips_the_provider() {
    let llm = Arc::new(ScriptedLlm::new());
    let market = Arc::new(StaticMarket::unavailable());
    let err = Fetcher::new(llm.clone(), market.clone(), FetchPolicy::default())
        .fetch_with_retry(&btc())
        .await
        .unwrap_err();

    assert!(matches!(err, RefreshError::MarketData { .. }), "{err}");
    assert_eq!(market.snapshot_calls(), 1);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn prompt_carries_market_context_and_track_record() {
    let (cache, _clock) = memory_cache(300);
    cache.upsert(&btc(), &recommendation(), &snapshot()).unwrap();
    let id = cache.history(Some(&btc()), 1).unwrap()[0].id;
    cache
        .mark_outcome(id, Outcome { hit: true, pnl: None })
        .unwrap();

    let llm = Arc::new(ScriptedLlm::new());
    let market = StaticMarket::default().with_funding_rate(rust_decimal::Decimal::new(1, 4));
    Fetcher::new(llm.clone(), Arc::new(market), FetchPolicy::default())
        .with_cache(cache.clone())
        .fetch_with_retry(&btc())
        .await
        .unwrap();

    let prompt = llm.last_prompt().expect("prompt recorded");
    assert!(prompt.contains("BTCUSDT"));
    assert!(prompt.contains("Current price: $64250.5"), "{prompt}");
    assert!(prompt.contains("Funding rate: +0.0100%"), "{prompt}");
    assert!(prompt.contains("hit rate: 100% over the last 1"), "{prompt}");

    let analytics = cache.market_analytics(&btc(), 7).unwrap().expect("sample recorded");
    assert_eq!(analytics.records, 1);
    assert_eq!(analytics.price.avg, snapshot().current_price);
    assert_eq!(analytics.funding.unwrap().avg, rust_decimal::Decimal::new(1, 4));
}

#[tokio::test(start_paused = true)]
async fn market_sample_recorded_even_when_attempts_fail() {
    let (cache, _clock) = memory_cache(300);
    let llm = Arc::new(ScriptedLlm::always(Reply::Text("no idea".into())));
    Fetcher::new(llm.clone(), Arc::new(StaticMarket::default()), FetchPolicy::default())
        .with_cache(cache.clone())
        .fetch_with_retry(&btc())
        .await
        .unwrap_err();

    let analytics = cache.market_analytics(&btc(), 7).unwrap().expect("sample recorded");
    assert_eq!(analytics.records, 1);
    assert!(analytics.funding.is_none());
}

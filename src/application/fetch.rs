//! One recommendation request with bounded retries.
//!
//! A refresh takes one market snapshot, gathers best-effort context, then
//! asks the provider up to `max_attempts` times. The two market requests are
//! bounded by `market_timeout`, each provider attempt by `attempt_timeout`.
//! A timeout, a transport failure and an unusable answer all count as a
//! failed attempt. Provider errors that will not clear up on retry end the
//! refresh immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::cache::CacheStore;
use super::prompt::build_prompt;
use super::validate::{validate_for, Validation};
use crate::domain::{MarketContext, PriceSnapshot, Recommendation, Symbol};
use crate::error::{Error, RefreshError};
use crate::port::outbound::llm::Llm;
use crate::port::outbound::market::MarketData;

/// Number of marked history rows summarized into the prompt.
pub const TRACK_RECORD_WINDOW: usize = 30;

/// Market requests made before the first provider attempt.
const MARKET_REQUESTS: u32 = 2;

/// Retry limits for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
    /// Bound on each market data request made before the first attempt.
    pub market_timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(60),
            retry_delay: Duration::from_secs(1),
            market_timeout: Duration::from_secs(15),
        }
    }
}

impl FetchPolicy {
    /// Worst-case wall time of the provider attempts: every attempt times
    /// out and every gap between attempts is waited out.
    #[must_use]
    pub fn total_budget(&self) -> Duration {
        self.attempt_timeout * self.max_attempts
            + self.retry_delay * self.max_attempts.saturating_sub(1)
    }

    /// Worst-case wall time of a whole refresh: the snapshot and funding
    /// rate requests followed by [`total_budget`](Self::total_budget).
    #[must_use]
    pub fn refresh_budget(&self) -> Duration {
        self.total_budget() + self.market_timeout * MARKET_REQUESTS
    }
}

/// Progress of the provider attempts for one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub symbol: Symbol,
    /// 1-based number of the attempt in progress or last made.
    pub attempt: u32,
    pub last_error: Option<String>,
}

impl FetchAttempt {
    fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            attempt: 0,
            last_error: None,
        }
    }

    fn fail(&mut self, error: String) {
        warn!(
            symbol = %self.symbol,
            attempt = self.attempt,
            error = %error,
            "Recommendation attempt failed"
        );
        self.last_error = Some(error);
    }
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub recommendation: Recommendation,
    /// Snapshot the recommendation was produced from.
    pub snapshot: PriceSnapshot,
    pub attempts: u32,
}

/// Requests recommendations from the provider.
pub struct Fetcher {
    llm: Arc<dyn Llm>,
    market: Arc<dyn MarketData>,
    policy: FetchPolicy,
    cache: Option<Arc<CacheStore>>,
}

impl Fetcher {
    #[must_use]
    pub fn new(llm: Arc<dyn Llm>, market: Arc<dyn MarketData>, policy: FetchPolicy) -> Self {
        Self {
            llm,
            market,
            policy,
            cache: None,
        }
    }

    /// Include the symbol's past hit rate from `cache` in each prompt and
    /// record every market sample taken there.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch a validated recommendation for `symbol`.
    ///
    /// # Errors
    ///
    /// - [`RefreshError::MarketData`] if the snapshot cannot be taken; no
    ///   provider attempt is made.
    /// - [`RefreshError::NonRetryable`] as soon as the provider refuses the
    ///   request or the credentials.
    /// - [`RefreshError::Exhausted`] after `max_attempts` failed attempts.
    pub async fn fetch_with_retry(&self, symbol: &Symbol) -> Result<Fetched, RefreshError> {
        let snapshot = self.snapshot(symbol).await?;
        let context = self.context(symbol, snapshot.clone()).await;
        let prompt = build_prompt(symbol, &context);

        let mut state = FetchAttempt::new(symbol.clone());
        while state.attempt < self.policy.max_attempts {
            if state.attempt > 0 && !self.policy.retry_delay.is_zero() {
                sleep(self.policy.retry_delay).await;
            }
            state.attempt += 1;
            debug!(symbol = %symbol, attempt = state.attempt, provider = self.llm.name(), "Requesting recommendation");

            let raw = match timeout(self.policy.attempt_timeout, self.llm.complete(&prompt)).await {
                Err(_) => {
                    state.fail(format!("timed out after {:?}", self.policy.attempt_timeout));
                    continue;
                }
                Ok(Err(Error::Provider(e))) if !e.is_retryable() => {
                    return Err(RefreshError::NonRetryable {
                        symbol: symbol.to_string(),
                        source: e,
                    });
                }
                Ok(Err(e)) => {
                    state.fail(e.to_string());
                    continue;
                }
                Ok(Ok(raw)) => raw,
            };

            match validate_for(&raw, symbol) {
                Validation::Accepted(recommendation) => {
                    info!(
                        symbol = %symbol,
                        attempt = state.attempt,
                        action = %recommendation.action,
                        direction = %recommendation.direction,
                        "Recommendation accepted"
                    );
                    return Ok(Fetched {
                        recommendation,
                        snapshot,
                        attempts: state.attempt,
                    });
                }
                Validation::Rejected(rejection) => state.fail(rejection.to_string()),
                Validation::NotFound => state.fail("no JSON object in response".to_string()),
            }
        }

        Err(RefreshError::Exhausted {
            symbol: symbol.to_string(),
            attempts: state.attempt,
            last_error: state.last_error.unwrap_or_default(),
        })
    }

    async fn snapshot(&self, symbol: &Symbol) -> Result<PriceSnapshot, RefreshError> {
        let market_error = |reason: String| RefreshError::MarketData {
            symbol: symbol.to_string(),
            reason,
        };
        match timeout(self.policy.market_timeout, self.market.price_snapshot(symbol)).await {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(e)) => Err(market_error(e.to_string())),
            Err(_) => Err(market_error(format!(
                "timed out after {:?}",
                self.policy.market_timeout
            ))),
        }
    }

    /// Funding rate and track record are optional; failures only cost context.
    /// The sample is recorded whether or not the provider later answers.
    async fn context(&self, symbol: &Symbol, snapshot: PriceSnapshot) -> MarketContext {
        let mut context = MarketContext::new(snapshot);

        match timeout(self.policy.market_timeout, self.market.funding_rate(symbol)).await {
            Ok(Ok(rate)) => context.funding_rate = rate,
            Ok(Err(e)) => debug!(symbol = %symbol, error = %e, "Funding rate unavailable"),
            Err(_) => debug!(symbol = %symbol, "Funding rate request timed out"),
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.record_market(symbol, &context) {
                warn!(symbol = %symbol, error = %e, "Failed to record market sample");
            }
            match cache.win_rate(Some(symbol), TRACK_RECORD_WINDOW) {
                Ok(record) if record.total > 0 => context.track_record = Some(record),
                Ok(_) => {}
                Err(e) => debug!(symbol = %symbol, error = %e, "Track record unavailable"),
            }
        }

        context
    }
}

//! Refresh service factory.

use std::sync::Arc;

use crate::application::cache::CacheStore;
use crate::application::fetch::Fetcher;
use crate::application::refresh::RefreshScheduler;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::llm::Llm;
use crate::port::outbound::market::MarketData;

/// Wire the fetcher and scheduler for the configured symbols.
///
/// The fetcher reads the track record from `cache` so past hit rates reach
/// the prompt, and records a market sample there on every refresh.
///
/// # Errors
///
/// Returns an error if a configured symbol is malformed.
pub fn build_scheduler(
    config: &Config,
    cache: Arc<CacheStore>,
    llm: Arc<dyn Llm>,
    market: Arc<dyn MarketData>,
) -> Result<RefreshScheduler> {
    let fetcher = Fetcher::new(llm, market, config.fetch_policy()).with_cache(cache.clone());
    Ok(RefreshScheduler::new(
        cache,
        Arc::new(fetcher),
        config.tracked_symbols()?,
        config.refresh_policy(),
    ))
}

//! Market data factory.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::binance::BinanceClient;
use crate::error::Result;
use crate::infrastructure::config::market::MarketConfig;
use crate::port::outbound::market::MarketData;

/// Build the market data client.
///
/// # Errors
///
/// Returns an error if the configured API URL is invalid.
pub fn build_market_data(config: &MarketConfig) -> Result<Arc<dyn MarketData>> {
    let client = BinanceClient::new(&config.api_url, Duration::from_secs(config.timeout_secs))?;
    info!(url = %config.api_url, "Market data client initialized");
    Ok(Arc::new(client))
}

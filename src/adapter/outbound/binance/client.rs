//! Binance futures REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::dto::{PremiumIndex, Ticker24h};
use crate::adapter::outbound::http::check_status;
use crate::domain::{PriceSnapshot, Symbol};
use crate::error::Result;
use crate::port::outbound::market::MarketData;

/// Production USD-M futures REST endpoint.
pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";

const NAME: &str = "binance";
const TICKER_PATH: &str = "/fapi/v1/ticker/24hr";
const PREMIUM_INDEX_PATH: &str = "/fapi/v1/premiumIndex";

/// Public market data from the Binance USD-M futures API. No credentials needed.
pub struct BinanceClient {
    http: HttpClient,
    base_url: Url,
}

impl BinanceClient {
    /// Create a client for `base_url` (e.g. `https://fapi.binance.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str, symbol: &Symbol) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("symbol", symbol.as_str());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "Binance request");
        let response = self.http.get(url).send().await?;
        Ok(check_status(NAME, response).await?.json::<T>().await?)
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn price_snapshot(&self, symbol: &Symbol) -> Result<PriceSnapshot> {
        let ticker: Ticker24h = self.get(self.endpoint(TICKER_PATH, symbol)?).await?;
        Ok(ticker.into())
    }

    async fn funding_rate(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        let index: PremiumIndex = self.get(self.endpoint(PREMIUM_INDEX_PATH, symbol)?).await?;
        Ok(index.funding_rate())
    }
}

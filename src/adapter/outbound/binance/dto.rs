//! Response shapes of the public futures endpoints.
//!
//! Binance encodes prices as decimal strings; `rust_decimal` accepts both
//! strings and numbers when deserializing.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::PriceSnapshot;

/// `GET /fapi/v1/ticker/24hr?symbol=...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub last_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub price_change_percent: Decimal,
}

impl From<Ticker24h> for PriceSnapshot {
    fn from(ticker: Ticker24h) -> Self {
        Self {
            current_price: ticker.last_price,
            high_24h: ticker.high_price,
            low_24h: ticker.low_price,
            change_pct_24h: ticker.price_change_percent,
        }
    }
}

/// `GET /fapi/v1/premiumIndex?symbol=...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    /// Empty for delivery contracts without funding.
    #[serde(default)]
    pub last_funding_rate: Option<String>,
}

impl PremiumIndex {
    pub fn funding_rate(&self) -> Option<Decimal> {
        self.last_funding_rate
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ticker_maps_to_snapshot() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "priceChange": "-94.99999800",
            "priceChangePercent": "-0.95",
            "weightedAvgPrice": "0.29628482",
            "lastPrice": "9905.00",
            "lastQty": "200.00000000",
            "openPrice": "10000.00",
            "highPrice": "10100.50",
            "lowPrice": "9800.00",
            "volume": "8913.30000000",
            "quoteVolume": "15.30000000",
            "openTime": 1499783499040,
            "closeTime": 1499869899040,
            "firstId": 28385,
            "lastId": 28460,
            "count": 76
        }"#;

        let ticker: Ticker24h = serde_json::from_str(json).unwrap();
        let snapshot = PriceSnapshot::from(ticker);
        assert_eq!(snapshot.current_price, dec!(9905.00));
        assert_eq!(snapshot.high_24h, dec!(10100.50));
        assert_eq!(snapshot.low_24h, dec!(9800.00));
        assert_eq!(snapshot.change_pct_24h, dec!(-0.95));
    }

    #[test]
    fn premium_index_funding_rate() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "markPrice": "11793.63104562",
            "indexPrice": "11781.80495970",
            "lastFundingRate": "0.00038246",
            "nextFundingTime": 1597392000000,
            "time": 1597370495002
        }"#;

        let index: PremiumIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.funding_rate(), Some(dec!(0.00038246)));
    }

    #[test]
    fn empty_funding_rate_is_none() {
        let index: PremiumIndex =
            serde_json::from_str(r#"{"symbol": "BTCUSD_200925", "lastFundingRate": ""}"#).unwrap();
        assert!(index.funding_rate().is_none());
    }
}

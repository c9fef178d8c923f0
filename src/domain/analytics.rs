//! Aggregates over recorded market samples.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::symbol::Symbol;

/// Days of market samples kept by default.
pub const DEFAULT_MARKET_RETENTION_DAYS: u32 = 7;

/// Market state observed at the start of one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSample {
    pub symbol: Symbol,
    pub price: Decimal,
    /// Funding rate as a fraction, if it could be fetched.
    pub funding_rate: Option<Decimal>,
    pub recorded_at: DateTime<Utc>,
}

/// Spread of recorded prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub avg: Decimal,
    pub max: Decimal,
    pub min: Decimal,
    /// `(max - min) / avg` as a percentage.
    pub volatility_pct: Decimal,
}

/// Spread of recorded funding rates, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundingRange {
    pub avg: Decimal,
    pub max: Decimal,
    pub min: Decimal,
}

/// Summary of a symbol's samples over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketAnalytics {
    pub symbol: Symbol,
    pub window_days: u32,
    pub records: usize,
    pub price: PriceRange,
    /// `None` when no sample carried a funding rate.
    pub funding: Option<FundingRange>,
}

impl MarketAnalytics {
    /// Aggregate `samples`. Returns `None` when there are none.
    ///
    /// Prices are rounded to two decimals, funding rates to six.
    #[must_use]
    pub fn from_samples(symbol: Symbol, window_days: u32, samples: &[MarketSample]) -> Option<Self> {
        let prices: Vec<Decimal> = samples.iter().map(|s| s.price).collect();
        let rates: Vec<Decimal> = samples.iter().filter_map(|s| s.funding_rate).collect();

        let (avg, max, min) = spread(&prices)?;
        let price = PriceRange {
            avg: avg.round_dp(2),
            max: max.round_dp(2),
            min: min.round_dp(2),
            volatility_pct: if avg.is_zero() {
                Decimal::ZERO
            } else {
                ((max - min) / avg * Decimal::ONE_HUNDRED).round_dp(2)
            },
        };
        let funding = spread(&rates).map(|(avg, max, min)| FundingRange {
            avg: avg.round_dp(6),
            max: max.round_dp(6),
            min: min.round_dp(6),
        });

        Some(Self {
            symbol,
            window_days,
            records: samples.len(),
            price,
            funding,
        })
    }
}

/// Mean, maximum and minimum of `values`.
fn spread(values: &[Decimal]) -> Option<(Decimal, Decimal, Decimal)> {
    let max = values.iter().max()?;
    let min = values.iter().min()?;
    let avg = values.iter().sum::<Decimal>() / Decimal::from(values.len());
    Some((avg, *max, *min))
}

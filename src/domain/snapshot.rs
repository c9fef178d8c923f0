//! Market state captured at fetch time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::history::WinRate;

/// Price summary for a symbol over the trailing 24 hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub current_price: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    /// Percent change over 24h, e.g. `-2.35` for a 2.35% drop.
    pub change_pct_24h: Decimal,
}

impl PriceSnapshot {
    /// Width of the 24h range as a percentage of the current price.
    ///
    /// Returns `None` when the current price is zero.
    #[must_use]
    pub fn range_pct(&self) -> Option<Decimal> {
        if self.current_price.is_zero() {
            return None;
        }
        Some(((self.high_24h - self.low_24h) / self.current_price * Decimal::ONE_HUNDRED).round_dp(2))
    }
}

/// Everything the recommendation provider is told about a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketContext {
    pub snapshot: PriceSnapshot,
    /// Last perpetual funding rate as a fraction (0.0001 = 0.01%).
    pub funding_rate: Option<Decimal>,
    /// Past accuracy of recommendations for this symbol.
    pub track_record: Option<WinRate>,
}

impl MarketContext {
    #[must_use]
    pub fn new(snapshot: PriceSnapshot) -> Self {
        Self {
            snapshot,
            funding_rate: None,
            track_record: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn range_pct_relative_to_current_price() {
        let snapshot = PriceSnapshot {
            current_price: dec!(100),
            high_24h: dec!(105),
            low_24h: dec!(95),
            change_pct_24h: dec!(1.5),
        };
        assert_eq!(snapshot.range_pct(), Some(dec!(10)));
    }

    #[test]
    fn range_pct_none_for_zero_price() {
        let snapshot = PriceSnapshot {
            current_price: Decimal::ZERO,
            high_24h: dec!(1),
            low_24h: dec!(0),
            change_pct_24h: Decimal::ZERO,
        };
        assert!(snapshot.range_pct().is_none());
    }
}

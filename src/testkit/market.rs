//! Fixed market data.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::fixtures::snapshot;
use crate::domain::{PriceSnapshot, Symbol};
use crate::error::{Error, Result};
use crate::port::outbound::market::MarketData;

/// [`MarketData`] returning the same snapshot for every symbol.
pub struct StaticMarket {
    snapshot: Option<PriceSnapshot>,
    funding_rate: Option<Decimal>,
    snapshot_delay: Duration,
    funding_hangs: bool,
    snapshot_calls: AtomicU32,
}

impl StaticMarket {
    pub fn new(snapshot: PriceSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            funding_rate: None,
            snapshot_delay: Duration::ZERO,
            funding_hangs: false,
            snapshot_calls: AtomicU32::new(0),
        }
    }

    /// Every snapshot request fails.
    pub fn unavailable() -> Self {
        Self {
            snapshot: None,
            ..Self::default()
        }
    }

    pub fn with_funding_rate(mut self, rate: Decimal) -> Self {
        self.funding_rate = Some(rate);
        self
    }

    /// Sleep for `delay` before answering each snapshot request.
    pub fn with_snapshot_delay(mut self, delay: Duration) -> Self {
        self.snapshot_delay = delay;
        self
    }

    /// Funding rate requests never complete.
    pub fn with_hanging_funding_rate(mut self) -> Self {
        self.funding_hangs = true;
        self
    }

    pub fn snapshot_calls(&self) -> u32 {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticMarket {
    fn default() -> Self {
        Self::new(snapshot())
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn price_snapshot(&self, symbol: &Symbol) -> Result<PriceSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if !self.snapshot_delay.is_zero() {
            tokio::time::sleep(self.snapshot_delay).await;
        }
        self.snapshot
            .clone()
            .ok_or_else(|| Error::Connection(format!("no market data for {symbol}")))
    }

    async fn funding_rate(&self, _symbol: &Symbol) -> Result<Option<Decimal>> {
        if self.funding_hangs {
            std::future::pending::<()>().await;
        }
        Ok(self.funding_rate)
    }
}

//! Market data port.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{PriceSnapshot, Symbol};
use crate::error::Result;

/// Read-only market data for a tradable symbol.
///
/// # Errors
///
/// Both methods fail on transport errors, unknown symbols or malformed
/// upstream payloads.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Current price and trailing 24h range.
    async fn price_snapshot(&self, symbol: &Symbol) -> Result<PriceSnapshot>;

    /// Latest perpetual funding rate, `None` if the venue has none for the symbol.
    async fn funding_rate(&self, symbol: &Symbol) -> Result<Option<Decimal>>;
}

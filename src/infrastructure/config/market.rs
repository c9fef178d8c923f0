//! Market data source configuration.

use serde::Deserialize;

use crate::adapter::outbound::binance::BINANCE_FUTURES_URL;

/// Binance futures REST settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    BINANCE_FUTURES_URL.into()
}

const fn default_timeout_secs() -> u64 {
    15
}

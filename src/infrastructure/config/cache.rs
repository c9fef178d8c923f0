//! Cache configuration.

use serde::Deserialize;

use crate::application::cache::CachePolicy;
use crate::domain::analytics::DEFAULT_MARKET_RETENTION_DAYS;
use crate::domain::entry::DEFAULT_TTL_SECS;
use crate::domain::history::DEFAULT_HISTORY_LIMIT;

/// Cache TTL and retention settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Seconds an entry stays fresh.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Stale entries are swept once older than `ttl_secs * retention_multiple`.
    #[serde(default = "default_retention_multiple")]
    pub retention_multiple: u32,

    /// History rows kept across all symbols.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Days of market samples kept for `tradewise summary`.
    #[serde(default = "default_market_retention_days")]
    pub market_retention_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            retention_multiple: default_retention_multiple(),
            history_limit: default_history_limit(),
            market_retention_days: default_market_retention_days(),
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl_secs: config.ttl_secs,
            retention_multiple: config.retention_multiple,
            history_limit: config.history_limit,
            market_retention_days: config.market_retention_days,
        }
    }
}

const fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

const fn default_retention_multiple() -> u32 {
    12
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

const fn default_market_retention_days() -> u32 {
    DEFAULT_MARKET_RETENTION_DAYS
}

//! Refresh loop and retry configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::fetch::FetchPolicy;
use crate::application::refresh::RefreshPolicy;

/// Refresh scheduling and per-refresh retry settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between checks for due symbols.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Seconds a symbol waits after a failed refresh.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Provider attempts per refresh.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds before a single provider attempt is abandoned.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Pause between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Seconds between retention sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl RefreshConfig {
    /// Retry policy; `market_timeout` bounds the market requests that
    /// precede the first attempt.
    #[must_use]
    pub fn fetch_policy(&self, market_timeout: Duration) -> FetchPolicy {
        FetchPolicy {
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            market_timeout,
        }
    }

    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            tick: Duration::from_secs(self.tick_secs),
            backoff: Duration::from_secs(self.backoff_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            backoff_secs: default_backoff_secs(),
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

const fn default_tick_secs() -> u64 {
    30
}

const fn default_backoff_secs() -> u64 {
    60
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_attempt_timeout_secs() -> u64 {
    60
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

const fn default_sweep_interval_secs() -> u64 {
    600
}

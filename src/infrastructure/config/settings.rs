//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; provider API keys come only from
//! the environment.
//!
//! # Example
//!
//! ```no_run
//! use tradewise::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::cache::CacheConfig;
use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::market::MarketConfig;
use super::refresh::RefreshConfig;
use crate::application::cache::CachePolicy;
use crate::application::fetch::FetchPolicy;
use crate::application::refresh::RefreshPolicy;
use crate::domain::Symbol;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "tradewise.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Symbols kept refreshed, e.g. `["BTCUSDT", "ETHUSDT"]`.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Recommendation provider.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Market data source.
    #[serde(default)]
    pub market: MarketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            symbols: default_symbols(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            refresh: RefreshConfig::default(),
            llm: LlmConfig::default(),
            market: MarketConfig::default(),
        }
    }
}

fn default_database_path() -> String {
    "tradewise.db".to_string()
}

fn default_symbols() -> Vec<String> {
    vec!["BTCUSDT".into(), "ETHUSDT".into(), "SOLUSDT".into()]
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Refresh timing must fit inside the TTL: the tick, the backoff and the
    /// worst-case refresh budget are each strictly shorter than `ttl_secs`.
    /// The budget counts both market requests and every provider attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] or [`ConfigError::InvalidValue`]
    /// for the first offending setting.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(ConfigError::MissingField { field: "symbols" }.into());
        }
        self.tracked_symbols()?;

        let ttl = self.cache.ttl_secs;
        if ttl == 0 {
            return Err(invalid("ttl_secs", "must be greater than 0").into());
        }
        if self.cache.retention_multiple < 1 {
            return Err(invalid("retention_multiple", "must be at least 1").into());
        }
        if self.cache.history_limit == 0 {
            return Err(invalid("history_limit", "must be greater than 0").into());
        }
        if self.cache.market_retention_days == 0 {
            return Err(invalid("market_retention_days", "must be greater than 0").into());
        }

        let refresh = &self.refresh;
        if refresh.tick_secs == 0 {
            return Err(invalid("tick_secs", "must be greater than 0").into());
        }
        if refresh.tick_secs >= ttl {
            return Err(invalid("tick_secs", format!("must be less than ttl_secs ({ttl})")).into());
        }
        if refresh.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0").into());
        }
        if refresh.attempt_timeout_secs == 0 {
            return Err(invalid("attempt_timeout_secs", "must be greater than 0").into());
        }
        if refresh.backoff_secs >= ttl {
            return Err(
                invalid("backoff_secs", format!("must be less than ttl_secs ({ttl})")).into(),
            );
        }
        if refresh.sweep_interval_secs == 0 {
            return Err(invalid("sweep_interval_secs", "must be greater than 0").into());
        }

        if self.market.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "market.api_url" }.into());
        }
        if self.market.timeout_secs == 0 {
            return Err(invalid("market.timeout_secs", "must be greater than 0").into());
        }

        let budget = self.fetch_policy().refresh_budget();
        if budget.as_secs_f64() >= ttl as f64 {
            return Err(invalid(
                "refresh",
                format!(
                    "worst-case refresh budget ({}s) must be less than ttl_secs ({ttl})",
                    budget.as_secs_f64()
                ),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("llm.temperature", "must be between 0 and 2").into());
        }
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "must be greater than 0").into());
        }
        Ok(())
    }

    /// Configured symbols, normalized and de-duplicated in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed symbol.
    #[allow(clippy::result_large_err)]
    pub fn tracked_symbols(&self) -> Result<Vec<Symbol>> {
        let mut symbols: Vec<Symbol> = Vec::with_capacity(self.symbols.len());
        for raw in &self.symbols {
            let symbol = Symbol::try_new(raw).map_err(|e| invalid("symbols", e.to_string()))?;
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    #[must_use]
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from(&self.cache)
    }

    /// Market requests share the HTTP timeout of the market client.
    #[must_use]
    pub fn fetch_policy(&self) -> FetchPolicy {
        self.refresh.fetch_policy(Duration::from_secs(self.market.timeout_secs))
    }

    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh.refresh_policy()
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

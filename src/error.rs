use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors reported by an upstream provider (LLM or market data).
///
/// The variants separate "upstream is rejecting us" from "upstream is
/// merely slow or flaky", which decides whether a request is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} rejected credentials (HTTP {status})")]
    Unauthorized { provider: &'static str, status: u16 },

    #[error("{provider} rejected the request (HTTP {status}): {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} unavailable (HTTP {status})")]
    Unavailable { provider: &'static str, status: u16 },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: &'static str },
}

impl ProviderError {
    /// Whether retrying the same request can plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::EmptyResponse { .. })
    }
}

/// Terminal outcomes of a refresh for one symbol.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("{symbol}: no valid recommendation after {attempts} attempts (last error: {last_error})")]
    Exhausted {
        symbol: String,
        attempts: u32,
        last_error: String,
    },

    #[error("{symbol}: provider refused the request: {source}")]
    NonRetryable {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    #[error("{symbol}: market data unavailable: {reason}")]
    MarketData { symbol: String, reason: String },

    #[error("{symbol}: refresh abandoned after {budget:?}")]
    BudgetExceeded { symbol: String, budget: Duration },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Whether the failure is transient and the request may be retried.
    ///
    /// Transport failures and upstream unavailability are retryable;
    /// authorization failures and rejected requests are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Http(_) | Self::Connection(_) | Self::Json(_) | Self::Parse(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

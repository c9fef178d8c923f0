//! Market symbol identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

const MAX_SYMBOL_LEN: usize = 32;

/// Tracked market identifier such as `BTCUSDT`.
///
/// Always upper-case ASCII alphanumeric. The inner String is private so all
/// construction goes through [`Symbol::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validate and normalize a symbol.
    ///
    /// Surrounding whitespace is trimmed and letters are upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSymbol`] for empty, overlong or
    /// non-alphanumeric input.
    pub fn try_new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidSymbol {
                symbol: raw.to_string(),
                reason: "must not be empty",
            });
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::InvalidSymbol {
                symbol: raw.to_string(),
                reason: "too long",
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidSymbol {
                symbol: raw.to_string(),
                reason: "must be ASCII letters and digits only",
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate inputs.
//!
//! ```
//! use tradewise::domain::error::DomainError;
//! use tradewise::domain::symbol::Symbol;
//!
//! let result = Symbol::try_new("BTC/USDT");
//! assert!(matches!(result, Err(DomainError::InvalidSymbol { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Symbols must be short, non-empty ASCII alphanumeric identifiers.
    #[error("invalid symbol '{symbol}': {reason}")]
    InvalidSymbol {
        /// The rejected input.
        symbol: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

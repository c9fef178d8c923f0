//! Wall-clock port.

use chrono::{DateTime, Utc};

/// Source of "now" for freshness decisions.
///
/// Cache validity is always computed against an injected clock so tests can
/// advance time without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

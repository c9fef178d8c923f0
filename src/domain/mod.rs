//! Exchange-agnostic domain types: symbols, snapshots, recommendations,
//! the cache entries that hold them and recorded market samples.

pub mod analytics;
pub mod entry;
pub mod error;
pub mod history;
pub mod recommendation;
pub mod snapshot;
pub mod symbol;

pub use analytics::{MarketAnalytics, MarketSample};
pub use entry::{CacheEntry, CacheStats};
pub use history::{HistoryRecord, Outcome, WinRate};
pub use recommendation::{Action, Direction, PositionSize, Recommendation};
pub use snapshot::{MarketContext, PriceSnapshot};
pub use symbol::Symbol;

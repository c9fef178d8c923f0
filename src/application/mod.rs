//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod cache;
pub mod fetch;
pub mod prompt;
pub mod read;
pub mod refresh;
pub mod validate;

pub use cache::{CachePolicy, CacheStore, Cached};
pub use fetch::{FetchPolicy, Fetched, Fetcher};
pub use read::{ReadOutcome, Reader, Reading, Source};
pub use refresh::{RefreshHandle, RefreshPolicy, RefreshScheduler, SymbolState, TriggerOutcome};
pub use validate::{validate, validate_for, Rejection, Validation};

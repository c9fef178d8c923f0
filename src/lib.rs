//! Tradewise - cached, periodically refreshed LLM trading recommendations.
//!
//! A background scheduler asks a language model for a structured trading
//! recommendation per tracked symbol, validates the answer and caches it
//! with a TTL. Readers are served from the cache immediately and never wait
//! on the model.
//!
//! # Architecture
//!
//! - [`domain`] - Symbols, recommendations, cache entries and history
//! - [`port`] - Traits for the model, market data, store and clock
//! - [`adapter`] - OpenAI/DeepSeek/Anthropic clients, Binance market data,
//!   SQLite and in-memory stores, and the CLI
//! - [`application`] - Response validation, retrying fetch, the cache store,
//!   the refresh scheduler and the read path
//! - [`infrastructure`] - Configuration and component wiring
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tradewise::adapter::outbound::clock::SystemClock;
//! use tradewise::adapter::outbound::memory::MemoryStore;
//! use tradewise::application::cache::{CachePolicy, CacheStore};
//! use tradewise::application::read::{ReadOutcome, Reader};
//! use tradewise::domain::Symbol;
//!
//! let cache = Arc::new(CacheStore::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock),
//!     CachePolicy::default(),
//! ));
//! let reader = Reader::new(cache);
//! let symbol = Symbol::try_new("BTCUSDT").unwrap();
//! assert_eq!(reader.read(&symbol), ReadOutcome::NotAvailable);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

//! Outbound adapters (driven side).

pub mod binance;
pub mod clock;
pub(crate) mod http;
pub mod llm;
pub mod memory;
pub mod sqlite;

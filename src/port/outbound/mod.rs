//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the recommendation provider, market data,
//! persistence and time.

pub mod clock;
pub mod llm;
pub mod market;
pub mod store;

//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - `ManualClock`, a [`Clock`](crate::port::outbound::clock::Clock)
//!   that only moves when told to.
//! - [`llm`] - `ScriptedLlm`, a provider with queued replies and a call counter.
//! - [`market`] - `StaticMarket`, fixed market data.
//! - [`fixtures`] - Canonical recommendations, snapshots and provider replies.

pub mod clock;
pub mod fixtures;
pub mod llm;
pub mod market;

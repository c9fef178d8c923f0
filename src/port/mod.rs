//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The refresh pipeline reaches every external system through one of these
//! traits, so tests can swap in scripted providers and an in-memory store.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Llm    │            │   Store     │              │  Market   │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

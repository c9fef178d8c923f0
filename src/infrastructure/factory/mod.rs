//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured infrastructure
//! components from application configuration. These factories handle
//! dependency injection and wiring.
//!
//! # Submodules
//!
//! - [`llm`] - Recommendation provider construction
//! - [`market`] - Market data client construction
//! - [`persistence`] - Database, store and cache construction
//! - [`refresh`] - Fetcher and refresh scheduler construction

pub mod llm;
pub mod market;
pub mod persistence;
pub mod refresh;

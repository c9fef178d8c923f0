//! Infrastructure configuration modules.

pub mod cache;
pub mod llm;
pub mod logging;
pub mod market;
pub mod refresh;
pub mod settings;

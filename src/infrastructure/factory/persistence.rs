//! Persistence factory for the recommendation store and cache.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::clock::SystemClock;
use crate::adapter::outbound::memory::MemoryStore;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteRecommendationStore};
use crate::application::cache::CacheStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::RecommendationStore;

/// Open the configured store.
///
/// `ephemeral` selects an in-memory store that is lost on exit; otherwise
/// the SQLite database is created and migrated as needed.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn build_store(config: &Config, ephemeral: bool) -> Result<Arc<dyn RecommendationStore>> {
    if ephemeral {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "SQLite store ready");
    Ok(Arc::new(SqliteRecommendationStore::new(pool)))
}

/// Build the cache over the configured store and the system clock.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn build_cache(config: &Config, ephemeral: bool) -> Result<Arc<CacheStore>> {
    let store = build_store(config, ephemeral)?;
    Ok(Arc::new(CacheStore::new(
        store,
        Arc::new(SystemClock),
        config.cache_policy(),
    )))
}

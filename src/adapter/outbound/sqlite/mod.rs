//! SQLite persistence adapter.

pub mod database;
mod store;

pub use database::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteRecommendationStore;

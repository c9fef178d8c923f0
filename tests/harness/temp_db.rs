use std::path::{Path, PathBuf};
use std::sync::Arc;

use diesel::prelude::*;
use tempfile::TempDir;
use tradewise::adapter::outbound::sqlite::{
    create_pool, run_migrations, DbPool, SqliteRecommendationStore,
};

/// Temporary SQLite database for integration tests, removed on drop.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("tradewise.db");
        let pool = create_pool(&path.to_string_lossy()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        // WAL mode improves concurrent writer behavior in tests.
        {
            let mut conn = pool.get().expect("get sqlite connection");
            diesel::sql_query("PRAGMA journal_mode=WAL")
                .execute(&mut conn)
                .expect("enable WAL mode");
        }

        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// A fresh store over a new pool on the same file.
    pub fn store(&self) -> Arc<SqliteRecommendationStore> {
        let pool = create_pool(&self.path.to_string_lossy()).expect("create sqlite pool");
        Arc::new(SqliteRecommendationStore::new(pool))
    }

    pub fn execute(&self, sql: &str) -> usize {
        let mut conn = self.pool.get().expect("get sqlite connection");
        diesel::sql_query(sql).execute(&mut conn).expect("execute sql")
    }
}

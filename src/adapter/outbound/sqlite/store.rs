//! SQLite recommendation store implementation.
//!
//! Persists the per-symbol cache and its history so restarts serve the
//! last known recommendations without a burst of upstream calls. Market
//! samples are kept alongside for a bounded number of days.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;

use super::database::connection::DbPool;
use super::database::model::{HistoryRow, NewHistoryRow, NewSampleRow, RecommendationRow, SampleRow};
use super::database::schema::{market_samples, recommendation_history, recommendations};
use crate::domain::Symbol;
use crate::error::{Error, Result};
use crate::port::outbound::store::{RecommendationStore, StoredEntry, StoredHistory, StoredSample};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    id: i64,
}

/// SQLite-backed recommendation store.
pub struct SqliteRecommendationStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteRecommendationStore {
    /// Create a new store with the given connection pool.
    ///
    /// The pool must already be migrated.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn db_err(e: diesel::result::Error) -> Error {
    Error::Database(e.to_string())
}

fn limit_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Delete all but the newest `keep` history rows.
fn trim_history(conn: &mut SqliteConnection, keep: usize) -> QueryResult<usize> {
    let keep = limit_i64(keep);
    if keep == 0 {
        return diesel::delete(recommendation_history::table).execute(conn);
    }
    let oldest_kept: Option<i64> = recommendation_history::table
        .select(recommendation_history::id)
        .order(recommendation_history::id.desc())
        .offset(keep - 1)
        .first(conn)
        .optional()?;
    match oldest_kept {
        Some(id) => diesel::delete(
            recommendation_history::table.filter(recommendation_history::id.lt(id)),
        )
        .execute(conn),
        None => Ok(0),
    }
}

impl RecommendationStore for SqliteRecommendationStore {
    fn upsert(&self, entry: &StoredEntry, history_limit: usize) -> Result<i64> {
        let mut conn = self.conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::replace_into(recommendations::table)
                .values(RecommendationRow::from(entry))
                .execute(conn)?;
            diesel::insert_into(recommendation_history::table)
                .values(NewHistoryRow::from(entry))
                .execute(conn)?;
            let id = diesel::sql_query("SELECT last_insert_rowid() AS id")
                .get_result::<LastInsertRowId>(conn)?
                .id;
            trim_history(conn, history_limit)?;
            Ok(id)
        })
        .map_err(db_err)
    }

    fn get(&self, symbol: &Symbol) -> Result<Option<StoredEntry>> {
        let mut conn = self.conn()?;
        let row: Option<RecommendationRow> = recommendations::table
            .find(symbol.as_str())
            .select(RecommendationRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        Ok(row.map(StoredEntry::from))
    }

    fn list(&self) -> Result<Vec<StoredEntry>> {
        let mut conn = self.conn()?;
        let rows: Vec<RecommendationRow> = recommendations::table
            .select(RecommendationRow::as_select())
            .order(recommendations::symbol.asc())
            .load(&mut conn)
            .map_err(db_err)?;
        Ok(rows.into_iter().map(StoredEntry::from).collect())
    }

    fn delete(&self, symbol: &Symbol) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(recommendations::table.find(symbol.as_str()))
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(deleted > 0)
    }

    fn delete_if_fetched_at(&self, symbol: &Symbol, fetched_at: f64) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            recommendations::table
                .filter(recommendations::symbol.eq(symbol.as_str()))
                .filter(recommendations::fetched_at.eq(fetched_at)),
        )
        .execute(&mut conn)
        .map_err(db_err)?;
        Ok(deleted > 0)
    }

    fn clear(&self) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(recommendations::table)
            .execute(&mut conn)
            .map_err(db_err)
    }

    fn delete_older_than(&self, cutoff: f64) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(recommendations::table.filter(recommendations::fetched_at.lt(cutoff)))
            .execute(&mut conn)
            .map_err(db_err)
    }

    fn history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>> {
        let mut conn = self.conn()?;
        let mut query = recommendation_history::table
            .select(HistoryRow::as_select())
            .order(recommendation_history::id.desc())
            .limit(limit_i64(limit))
            .into_boxed();
        if let Some(symbol) = symbol {
            query = query.filter(recommendation_history::symbol.eq(symbol.as_str().to_owned()));
        }
        let rows = query.load(&mut conn).map_err(db_err)?;
        Ok(rows.into_iter().map(StoredHistory::from).collect())
    }

    fn latest_history_since(&self, symbol: &Symbol, since: f64) -> Result<Option<StoredHistory>> {
        let mut conn = self.conn()?;
        let row: Option<HistoryRow> = recommendation_history::table
            .select(HistoryRow::as_select())
            .filter(recommendation_history::symbol.eq(symbol.as_str()))
            .filter(recommendation_history::fetched_at.ge(since))
            .order(recommendation_history::id.desc())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        Ok(row.map(StoredHistory::from))
    }

    fn mark_outcome(&self, id: i64, hit: bool, pnl: Option<f64>) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(recommendation_history::table.find(id))
            .set((
                recommendation_history::hit.eq(Some(hit)),
                recommendation_history::pnl.eq(pnl),
            ))
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(updated > 0)
    }

    fn marked_history(&self, symbol: Option<&Symbol>, limit: usize) -> Result<Vec<StoredHistory>> {
        let mut conn = self.conn()?;
        let mut query = recommendation_history::table
            .select(HistoryRow::as_select())
            .filter(recommendation_history::hit.is_not_null())
            .order(recommendation_history::id.desc())
            .limit(limit_i64(limit))
            .into_boxed();
        if let Some(symbol) = symbol {
            query = query.filter(recommendation_history::symbol.eq(symbol.as_str().to_owned()));
        }
        let rows = query.load(&mut conn).map_err(db_err)?;
        Ok(rows.into_iter().map(StoredHistory::from).collect())
    }

    fn history_symbols(&self) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        recommendation_history::table
            .select(recommendation_history::symbol)
            .distinct()
            .order(recommendation_history::symbol.asc())
            .load(&mut conn)
            .map_err(db_err)
    }

    fn record_sample(&self, sample: &StoredSample, cutoff: f64) -> Result<usize> {
        let mut conn = self.conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(market_samples::table)
                .values(NewSampleRow::from(sample))
                .execute(conn)?;
            diesel::delete(market_samples::table.filter(market_samples::recorded_at.lt(cutoff)))
                .execute(conn)
        })
        .map_err(db_err)
    }

    fn samples_since(&self, symbol: &Symbol, since: f64) -> Result<Vec<StoredSample>> {
        let mut conn = self.conn()?;
        let rows: Vec<SampleRow> = market_samples::table
            .select(SampleRow::as_select())
            .filter(market_samples::symbol.eq(symbol.as_str()))
            .filter(market_samples::recorded_at.ge(since))
            .order(market_samples::id.desc())
            .load(&mut conn)
            .map_err(db_err)?;
        Ok(rows.into_iter().map(StoredSample::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};

    fn setup_test_db() -> SqliteRecommendationStore {
        let pool = create_pool(":memory:").expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        SqliteRecommendationStore::new(pool)
    }

    fn row(symbol: &str, fetched_at: f64) -> StoredEntry {
        StoredEntry {
            symbol: symbol.to_string(),
            payload: r#"{"action":"skip"}"#.to_string(),
            snapshot: "{}".to_string(),
            fetched_at,
            ttl_secs: 300,
        }
    }

    fn sym(s: &str) -> Symbol {
        Symbol::try_new(s).unwrap()
    }

    #[test]
    fn upsert_roundtrip() {
        let store = setup_test_db();
        store.upsert(&row("BTCUSDT", 1_700_000_000.25), 10).unwrap();

        let loaded = store.get(&sym("BTCUSDT")).unwrap().unwrap();
        assert_eq!(loaded, row("BTCUSDT", 1_700_000_000.25));
    }

    #[test]
    fn upsert_replaces_row_and_returns_history_ids() {
        let store = setup_test_db();
        let first = store.upsert(&row("BTCUSDT", 1.0), 10).unwrap();
        let second = store.upsert(&row("BTCUSDT", 2.0), 10).unwrap();

        assert!(second > first);
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.get(&sym("BTCUSDT")).unwrap().unwrap().fetched_at, 2.0);
        assert_eq!(store.history(None, 10).unwrap().len(), 2);
    }

    #[test]
    fn history_trimmed_to_newest() {
        let store = setup_test_db();
        for i in 0..6 {
            store.upsert(&row("ETHUSDT", f64::from(i)), 4).unwrap();
        }
        let history = store.history(None, 100).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].fetched_at, 5.0);
        assert_eq!(history[3].fetched_at, 2.0);
    }

    #[test]
    fn compare_and_delete() {
        let store = setup_test_db();
        store.upsert(&row("BTCUSDT", 10.5), 10).unwrap();
        assert!(!store.delete_if_fetched_at(&sym("BTCUSDT"), 10.0).unwrap());
        assert!(store.delete_if_fetched_at(&sym("BTCUSDT"), 10.5).unwrap());
        assert!(store.get(&sym("BTCUSDT")).unwrap().is_none());
    }

    #[test]
    fn delete_older_than_keeps_recent_rows() {
        let store = setup_test_db();
        store.upsert(&row("BTCUSDT", 100.0), 10).unwrap();
        store.upsert(&row("ETHUSDT", 200.0), 10).unwrap();

        assert_eq!(store.delete_older_than(150.0).unwrap(), 1);
        let remaining: Vec<String> = store.list().unwrap().into_iter().map(|e| e.symbol).collect();
        assert_eq!(remaining, vec!["ETHUSDT"]);
    }

    #[test]
    fn clear_keeps_history() {
        let store = setup_test_db();
        store.upsert(&row("BTCUSDT", 1.0), 10).unwrap();
        store.upsert(&row("ETHUSDT", 1.0), 10).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.history_symbols().unwrap(), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn latest_history_respects_window() {
        let store = setup_test_db();
        store.upsert(&row("BTCUSDT", 100.0), 10).unwrap();
        store.upsert(&row("BTCUSDT", 200.0), 10).unwrap();

        let latest = store.latest_history_since(&sym("BTCUSDT"), 150.0).unwrap().unwrap();
        assert_eq!(latest.fetched_at, 200.0);
        assert!(store.latest_history_since(&sym("BTCUSDT"), 250.0).unwrap().is_none());
        assert!(store.latest_history_since(&sym("ETHUSDT"), 0.0).unwrap().is_none());
    }

    #[test]
    fn mark_outcome_and_filter_marked() {
        let store = setup_test_db();
        let first = store.upsert(&row("BTCUSDT", 1.0), 10).unwrap();
        store.upsert(&row("BTCUSDT", 2.0), 10).unwrap();
        store.upsert(&row("ETHUSDT", 3.0), 10).unwrap();

        assert!(store.mark_outcome(first, false, Some(-2.5)).unwrap());
        assert!(!store.mark_outcome(999, true, None).unwrap());

        let marked = store.marked_history(Some(&sym("BTCUSDT")), 10).unwrap();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].hit, Some(false));
        assert_eq!(marked[0].pnl, Some(-2.5));
        assert!(store.marked_history(Some(&sym("ETHUSDT")), 10).unwrap().is_empty());
    }

    #[test]
    fn samples_keep_funding_rate_and_respect_cutoff() {
        let store = setup_test_db();
        let sample = |symbol: &str, recorded_at: f64, funding_rate: Option<f64>| StoredSample {
            symbol: symbol.to_string(),
            price: 64_250.5,
            funding_rate,
            recorded_at,
        };
        store.record_sample(&sample("BTCUSDT", 100.0, None), 0.0).unwrap();
        store.record_sample(&sample("ETHUSDT", 150.0, Some(0.0002)), 0.0).unwrap();
        assert_eq!(store.record_sample(&sample("BTCUSDT", 200.0, Some(0.0001)), 120.0).unwrap(), 1);

        let btc = store.samples_since(&sym("BTCUSDT"), 0.0).unwrap();
        assert_eq!(btc, vec![sample("BTCUSDT", 200.0, Some(0.0001))]);
        let eth = store.samples_since(&sym("ETHUSDT"), 0.0).unwrap();
        assert_eq!(eth[0].funding_rate, Some(0.0002));
        assert!(store.samples_since(&sym("ETHUSDT"), 151.0).unwrap().is_empty());
    }
}

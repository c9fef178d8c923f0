//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{market_samples, recommendation_history, recommendations};
use crate::port::outbound::store::{StoredEntry, StoredHistory, StoredSample};

/// Database row for a cached recommendation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = recommendations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecommendationRow {
    pub symbol: String,
    pub payload: String,
    pub snapshot: String,
    pub fetched_at: f64,
    pub ttl_secs: i64,
}

/// Database row for a history record (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = recommendation_history)]
pub struct NewHistoryRow<'a> {
    pub symbol: &'a str,
    pub payload: &'a str,
    pub snapshot: &'a str,
    pub fetched_at: f64,
}

/// Database row for a history record (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = recommendation_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryRow {
    pub id: i64,
    pub symbol: String,
    pub payload: String,
    pub snapshot: String,
    pub fetched_at: f64,
    pub hit: Option<bool>,
    pub pnl: Option<f64>,
}

/// Database row for a market sample (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = market_samples)]
pub struct NewSampleRow<'a> {
    pub symbol: &'a str,
    pub price: f64,
    pub funding_rate: Option<f64>,
    pub recorded_at: f64,
}

/// Database row for a market sample (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = market_samples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SampleRow {
    pub symbol: String,
    pub price: f64,
    pub funding_rate: Option<f64>,
    pub recorded_at: f64,
}

impl From<&StoredEntry> for RecommendationRow {
    fn from(entry: &StoredEntry) -> Self {
        Self {
            symbol: entry.symbol.clone(),
            payload: entry.payload.clone(),
            snapshot: entry.snapshot.clone(),
            fetched_at: entry.fetched_at,
            ttl_secs: entry.ttl_secs,
        }
    }
}

impl From<RecommendationRow> for StoredEntry {
    fn from(row: RecommendationRow) -> Self {
        Self {
            symbol: row.symbol,
            payload: row.payload,
            snapshot: row.snapshot,
            fetched_at: row.fetched_at,
            ttl_secs: row.ttl_secs,
        }
    }
}

impl<'a> From<&'a StoredEntry> for NewHistoryRow<'a> {
    fn from(entry: &'a StoredEntry) -> Self {
        Self {
            symbol: &entry.symbol,
            payload: &entry.payload,
            snapshot: &entry.snapshot,
            fetched_at: entry.fetched_at,
        }
    }
}

impl From<HistoryRow> for StoredHistory {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            symbol: row.symbol,
            payload: row.payload,
            snapshot: row.snapshot,
            fetched_at: row.fetched_at,
            hit: row.hit,
            pnl: row.pnl,
        }
    }
}

impl<'a> From<&'a StoredSample> for NewSampleRow<'a> {
    fn from(sample: &'a StoredSample) -> Self {
        Self {
            symbol: &sample.symbol,
            price: sample.price,
            funding_rate: sample.funding_rate,
            recorded_at: sample.recorded_at,
        }
    }
}

impl From<SampleRow> for StoredSample {
    fn from(row: SampleRow) -> Self {
        Self {
            symbol: row.symbol,
            price: row.price,
            funding_rate: row.funding_rate,
            recorded_at: row.recorded_at,
        }
    }
}

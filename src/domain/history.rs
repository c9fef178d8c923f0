//! Past recommendations and their marked outcomes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::recommendation::Recommendation;
use super::snapshot::PriceSnapshot;
use super::symbol::Symbol;

/// Default number of history rows kept across all symbols.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Whether a past recommendation worked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub hit: bool,
    pub pnl: Option<Decimal>,
}

/// One immutable history row, written alongside every successful upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub symbol: Symbol,
    pub payload: Recommendation,
    pub snapshot: PriceSnapshot,
    pub fetched_at: DateTime<Utc>,
    pub outcome: Option<Outcome>,
}

/// Hit rate over a window of marked history rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WinRate {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage with one decimal, e.g. `66.7`.
    pub win_rate_pct: f64,
    /// Mean of the recorded PnL values, two decimals.
    pub avg_pnl: Decimal,
}

impl WinRate {
    /// Aggregate marked outcomes. Outcomes without PnL still count as hits
    /// or misses but are left out of the average.
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let total = outcomes.len();
        if total == 0 {
            return Self::default();
        }
        let wins = outcomes.iter().filter(|o| o.hit).count();
        let pnls: Vec<Decimal> = outcomes.iter().filter_map(|o| o.pnl).collect();
        let avg_pnl = if pnls.is_empty() {
            Decimal::ZERO
        } else {
            (pnls.iter().sum::<Decimal>() / Decimal::from(pnls.len())).round_dp(2)
        };
        let pct = wins as f64 / total as f64 * 100.0;
        Self {
            total,
            wins,
            losses: total - wins,
            win_rate_pct: (pct * 10.0).round() / 10.0,
            avg_pnl,
        }
    }
}

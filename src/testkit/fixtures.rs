//! Canonical test data.
//!
//! [`valid_json`] is a provider reply that validates into exactly
//! [`recommendation`].

use rust_decimal::Decimal;

use crate::domain::{Action, Direction, PositionSize, PriceSnapshot, Recommendation};

pub fn recommendation() -> Recommendation {
    Recommendation {
        action: Action::Enter,
        direction: Direction::Long,
        position_size: PositionSize::Light,
        entry_price: Decimal::new(642_505, 1),
        stop_loss: Decimal::new(63_000, 0),
        take_profit: Decimal::new(66_500, 0),
        resistance: Some(Decimal::new(65_800, 0)),
        support: Some(Decimal::new(63_500, 0)),
        risk_reward: Some("1:1.8".to_string()),
        rationale: "Higher lows on the 4h chart.".to_string(),
        risk_note: "Funding is elevated.".to_string(),
        analyzed_at: Some("2026-01-15 09:30 UTC".to_string()),
    }
}

pub fn snapshot() -> PriceSnapshot {
    PriceSnapshot {
        current_price: Decimal::new(642_505, 1),
        high_24h: Decimal::new(65_000, 0),
        low_24h: Decimal::new(63_000, 0),
        change_pct_24h: Decimal::new(-125, 2),
    }
}

/// A bare provider reply for `symbol`.
pub fn valid_json_for(symbol: &str) -> String {
    format!(
        r#"{{
  "symbol": "{symbol}",
  "action": "enter",
  "direction": "long",
  "position_size": "light",
  "entry_price": 64250.5,
  "stop_loss": 63000,
  "take_profit": 66500,
  "resistance": 65800,
  "support": 63500,
  "risk_reward": "1:1.8",
  "rationale": "Higher lows on the 4h chart.",
  "risk_note": "Funding is elevated.",
  "analyzed_at": "2026-01-15 09:30 UTC"
}}"#
    )
}

/// A bare provider reply without a symbol field.
pub fn valid_json() -> String {
    valid_json_for("BTCUSDT").replacen("  \"symbol\": \"BTCUSDT\",\n", "", 1)
}

/// [`valid_json`] wrapped in prose and a code fence, the way chat models answer.
pub fn prose_wrapped_json() -> String {
    format!(
        "Here is my analysis of the current setup.\n\n```json\n{}\n```\n\nTrade carefully.",
        valid_json()
    )
}

//! Structured trading recommendation produced by the provider.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether the provider suggests opening a position now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Enter,
    Skip,
}

/// Side of the suggested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

/// Suggested position weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSize {
    Heavy,
    Light,
    None,
}

macro_rules! token_enum {
    ($ty:ident { $($token:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            /// Every accepted token, lower-case.
            pub const TOKENS: &'static [&'static str] = &[$($token),+];

            /// Parse a categorical token, ignoring case and surrounding whitespace.
            #[must_use]
            pub fn from_token(token: &str) -> Option<Self> {
                match token.trim().to_ascii_lowercase().as_str() {
                    $($token => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The canonical lower-case token.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

token_enum!(Action { "enter" => Enter, "skip" => Skip });
token_enum!(Direction { "long" => Long, "short" => Short, "neutral" => Neutral });
token_enum!(PositionSize { "heavy" => Heavy, "light" => Light, "none" => None });

impl PositionSize {
    /// Size assumed when the provider leaves it out.
    #[must_use]
    pub const fn default_for(action: Action) -> Self {
        match action {
            Action::Enter => Self::Light,
            Action::Skip => Self::None,
        }
    }
}

/// A fully validated recommendation.
///
/// Only the response validator builds these from provider output; every
/// optional field already carries its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub direction: Direction,
    pub position_size: PositionSize,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<Decimal>,
    /// Free-form ratio such as `1:2.5`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<String>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub risk_note: String,
    /// Analysis time as reported by the provider, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
}

impl Recommendation {
    /// Reward divided by risk implied by entry, stop and target.
    ///
    /// Returns `None` when the stop equals the entry.
    #[must_use]
    pub fn reward_to_risk(&self) -> Option<Decimal> {
        let risk = (self.entry_price - self.stop_loss).abs();
        if risk.is_zero() {
            return None;
        }
        let reward = (self.take_profit - self.entry_price).abs();
        Some((reward / risk).round_dp(2))
    }
}

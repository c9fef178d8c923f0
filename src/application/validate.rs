//! Response validation: raw provider text to a [`Recommendation`].
//!
//! Providers wrap their JSON in prose and code fences, quote numbers,
//! prefix prices with `$` and vary the case of categorical values. The
//! validator tolerates all of that and rejects everything else. Malformed
//! output is a [`Validation`] value, never an error or a panic.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{Action, Direction, PositionSize, Recommendation, Symbol};

/// Upper bound on `{` positions tried before giving up on a response.
const MAX_CANDIDATES: usize = 64;

/// Outcome of validating one provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accepted(Recommendation),
    /// A JSON object (or something shaped like one) was found but is unusable.
    Rejected(Rejection),
    /// The text contains no JSON object at all.
    NotFound,
}

impl Validation {
    #[must_use]
    pub fn into_accepted(self) -> Option<Recommendation> {
        match self {
            Self::Accepted(rec) => Some(rec),
            _ => None,
        }
    }
}

/// Why a candidate object was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("response is for {found}, expected {expected}")]
    SymbolMismatch { expected: String, found: String },
}

/// Validate a response without checking which symbol it names.
#[must_use]
pub fn validate(raw: &str) -> Validation {
    check(raw, None)
}

/// Validate a response requested for `symbol`.
///
/// A `symbol` field in the response, when present, must name the same
/// symbol (case-insensitive).
#[must_use]
pub fn validate_for(raw: &str, symbol: &Symbol) -> Validation {
    check(raw, Some(symbol))
}

fn check(raw: &str, expected: Option<&Symbol>) -> Validation {
    match extract_object(raw) {
        Extracted::Object(object) => match build(&object, expected) {
            Ok(rec) => Validation::Accepted(rec),
            Err(rejection) => Validation::Rejected(rejection),
        },
        Extracted::Malformed(reason) => Validation::Rejected(Rejection::Malformed(reason)),
        Extracted::None => Validation::NotFound,
    }
}

enum Extracted {
    Object(Map<String, Value>),
    Malformed(String),
    None,
}

/// Find the first well-formed JSON object in `raw`.
///
/// Every `{` is tried as the start of a JSON value, left to right, so the
/// outermost object wins over anything nested in it and surrounding prose
/// or fences are skipped.
fn extract_object(raw: &str) -> Extracted {
    let mut first_error = None;
    for (start, _) in raw.match_indices('{').take(MAX_CANDIDATES) {
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => return Extracted::Object(object),
            Some(Err(e)) if first_error.is_none() => first_error = Some(e.to_string()),
            _ => {}
        }
    }
    match first_error {
        Some(reason) => Extracted::Malformed(reason),
        None => Extracted::None,
    }
}

/// Case-insensitive key lookup; `null` counts as absent.
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .get(name)
        .or_else(|| {
            object
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .filter(|v| !v.is_null())
}

fn invalid(field: &'static str, value: &Value) -> Rejection {
    Rejection::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn token<T>(
    object: &Map<String, Value>,
    name: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, Rejection> {
    match field(object, name) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .and_then(parse)
            .map(Some)
            .ok_or_else(|| invalid(name, value)),
    }
}

/// Parse a price: JSON number or numeric string, optionally with `$` and
/// thousands separators.
fn parse_price(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().trim_start_matches('$').trim().replace(',', ""),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .filter(|d| d.is_sign_positive() && !d.is_zero())
}

fn price(object: &Map<String, Value>, name: &'static str) -> Result<Option<Decimal>, Rejection> {
    match field(object, name) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => parse_price(value).map(Some).ok_or_else(|| invalid(name, value)),
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T, Rejection> {
    value.ok_or(Rejection::MissingField(name))
}

fn text(object: &Map<String, Value>, name: &'static str) -> Result<Option<String>, Rejection> {
    match field(object, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(value) => Err(invalid(name, value)),
    }
}

fn build(object: &Map<String, Value>, expected: Option<&Symbol>) -> Result<Recommendation, Rejection> {
    let action = required(token(object, "action", Action::from_token)?, "action")?;
    let direction = required(token(object, "direction", Direction::from_token)?, "direction")?;
    let position_size = token(object, "position_size", PositionSize::from_token)?
        .unwrap_or_else(|| PositionSize::default_for(action));

    let entry_price = required(price(object, "entry_price")?, "entry_price")?;
    let stop_loss = required(price(object, "stop_loss")?, "stop_loss")?;
    let take_profit = required(price(object, "take_profit")?, "take_profit")?;
    let resistance = price(object, "resistance")?;
    let support = price(object, "support")?;

    let risk_reward = match field(object, "risk_reward") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    if let (Some(expected), Some(found)) = (expected, text(object, "symbol")?) {
        if !found.eq_ignore_ascii_case(expected.as_str()) {
            return Err(Rejection::SymbolMismatch {
                expected: expected.to_string(),
                found,
            });
        }
    }

    Ok(Recommendation {
        action,
        direction,
        position_size,
        entry_price,
        stop_loss,
        take_profit,
        resistance,
        support,
        risk_reward,
        rationale: text(object, "rationale")?.unwrap_or_default(),
        risk_note: text(object, "risk_note")?.unwrap_or_default(),
        analyzed_at: text(object, "analyzed_at")?.filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const VALID: &str = r#"{
        "symbol": "BTCUSDT",
        "action": "enter",
        "direction": "long",
        "position_size": "heavy",
        "entry_price": 64250.5,
        "stop_loss": "63000",
        "take_profit": "$66,500.00",
        "resistance": 65800,
        "support": "63500",
        "risk_reward": "1:1.8",
        "rationale": "Higher lows on the 4h chart.",
        "risk_note": "Funding is elevated.",
        "analyzed_at": "2026-01-15 09:30"
    }"#;

    fn accepted(raw: &str) -> Recommendation {
        match validate(raw) {
            Validation::Accepted(rec) => rec,
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    fn rejected(raw: &str) -> Rejection {
        match validate(raw) {
            Validation::Rejected(r) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn accepts_full_object() {
        let rec = accepted(VALID);
        assert_eq!(rec.action, Action::Enter);
        assert_eq!(rec.direction, Direction::Long);
        assert_eq!(rec.position_size, PositionSize::Heavy);
        assert_eq!(rec.entry_price, dec!(64250.5));
        assert_eq!(rec.stop_loss, dec!(63000));
        assert_eq!(rec.take_profit, dec!(66500));
        assert_eq!(rec.resistance, Some(dec!(65800)));
        assert_eq!(rec.support, Some(dec!(63500)));
        assert_eq!(rec.risk_reward.as_deref(), Some("1:1.8"));
        assert_eq!(rec.analyzed_at.as_deref(), Some("2026-01-15 09:30"));
    }

    #[test]
    fn extracts_object_from_prose_and_fences() {
        let raw = format!("Here is my analysis:\n```json\n{VALID}\n```\nGood luck {{and}} trade safely.");
        assert_eq!(accepted(&raw), accepted(VALID));
    }

    #[test]
    fn skips_brace_prose_before_object() {
        let raw = format!("Using {{template}} below. {VALID}");
        assert_eq!(accepted(&raw).direction, Direction::Long);
    }

    #[test]
    fn applies_defaults_for_optional_fields() {
        let rec = accepted(
            r#"{"action":"SKIP","direction":"Neutral","entry_price":1,"stop_loss":1,"take_profit":1}"#,
        );
        assert_eq!(rec.position_size, PositionSize::None);
        assert!(rec.resistance.is_none());
        assert!(rec.support.is_none());
        assert!(rec.risk_reward.is_none());
        assert_eq!(rec.rationale, "");
        assert_eq!(rec.risk_note, "");
        assert!(rec.analyzed_at.is_none());

        let rec = accepted(
            r#"{"action":"enter","direction":"short","entry_price":1,"stop_loss":2,"take_profit":0.5}"#,
        );
        assert_eq!(rec.position_size, PositionSize::Light);
    }

    #[test]
    fn no_object_is_not_found() {
        assert_eq!(validate("I cannot help with that."), Validation::NotFound);
        assert_eq!(validate(""), Validation::NotFound);
        assert_eq!(validate("[1, 2, 3]"), Validation::NotFound);
    }

    #[test]
    fn truncated_object_is_malformed() {
        let raw = r#"{"action": "enter", "direction": "long", "entry_price": 1"#;
        assert!(matches!(rejected(raw), Rejection::Malformed(_)));
    }

    #[test]
    fn missing_required_field() {
        let raw = r#"{"action":"enter","direction":"long","entry_price":1,"stop_loss":1}"#;
        assert_eq!(rejected(raw), Rejection::MissingField("take_profit"));

        let raw = r#"{"action":"enter","direction":null,"entry_price":1,"stop_loss":1,"take_profit":1}"#;
        assert_eq!(rejected(raw), Rejection::MissingField("direction"));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let raw = r#"{"action":"maybe","direction":"long","entry_price":1,"stop_loss":1,"take_profit":1}"#;
        assert!(matches!(
            rejected(raw),
            Rejection::InvalidValue { field: "action", .. }
        ));

        let raw = r#"{"action":"enter","direction":"long","position_size":"all-in","entry_price":1,"stop_loss":1,"take_profit":1}"#;
        assert!(matches!(
            rejected(raw),
            Rejection::InvalidValue { field: "position_size", .. }
        ));
    }

    #[test]
    fn non_positive_or_non_numeric_prices_are_rejected() {
        for bad in [r#"0"#, r#"-5"#, r#""N/A""#, r#""NaN""#, r#"true"#] {
            let raw = format!(
                r#"{{"action":"enter","direction":"long","entry_price":{bad},"stop_loss":1,"take_profit":1}}"#
            );
            assert!(
                matches!(rejected(&raw), Rejection::InvalidValue { field: "entry_price", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_optional_level_is_rejected() {
        let raw = r#"{"action":"skip","direction":"neutral","entry_price":1,"stop_loss":1,"take_profit":1,"support":"unknown"}"#;
        assert!(matches!(
            rejected(raw),
            Rejection::InvalidValue { field: "support", .. }
        ));
    }

    #[test]
    fn symbol_must_match_request() {
        let btc = Symbol::try_new("BTCUSDT").unwrap();
        let eth = Symbol::try_new("ETHUSDT").unwrap();

        assert!(matches!(validate_for(VALID, &btc), Validation::Accepted(_)));
        assert!(matches!(
            validate_for(VALID, &eth),
            Validation::Rejected(Rejection::SymbolMismatch { .. })
        ));

        let lower = VALID.replace("\"BTCUSDT\"", "\"btcusdt\"");
        assert!(matches!(validate_for(&lower, &btc), Validation::Accepted(_)));
    }

    #[test]
    fn keys_match_case_insensitively() {
        let raw = r#"{"Action":"enter","DIRECTION":"long","Entry_Price":"2","stop_loss":"1","take_profit":"4"}"#;
        assert_eq!(accepted(raw).entry_price, dec!(2));
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let raw = r#"{"action":"enter","direction":"long","entry_price":1.5e3,"stop_loss":1e3,"take_profit":2e3}"#;
        let rec = accepted(raw);
        assert_eq!(rec.entry_price, dec!(1500));
        assert_eq!(rec.stop_loss, dec!(1000));
    }

    #[test]
    fn garbage_never_panics() {
        for raw in ["{", "}{", "{{{{", "{\"a\":", "\u{0}{\u{ffff}}", "{\"action\":[]}"] {
            let _ = validate(raw);
        }
    }
}

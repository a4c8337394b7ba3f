//! Coercion of loosely-typed document fields.
//!
//! POS documents are written by several clients over the years, so the same
//! logical field may arrive as a number, a numeric string, or not at all.
//! These helpers are the only place raw JSON values are inspected; callers
//! get plain Rust values with documented fallbacks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

use super::Record;

/// First non-blank string among `keys`, trimmed.
///
/// Non-string values are ignored, matching the POS's "falsy means absent"
/// reading of these fields.
#[must_use]
pub fn text(data: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Like [`text`] but never absent.
#[must_use]
pub fn text_or_empty(data: &Record, keys: &[&str]) -> String {
    text(data, keys).unwrap_or_default()
}

/// `true` only for a literal JSON `true`.
#[must_use]
pub fn flag(data: &Record, key: &str) -> bool {
    matches!(data.get(key), Some(Value::Bool(true)))
}

/// A decimal from a JSON number or a numeric string.
///
/// Returns `None` for anything else, including non-finite or unparseable
/// strings.
#[must_use]
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// A non-negative amount. Missing, non-numeric and negative values become 0.
#[must_use]
pub fn amount(data: &Record, key: &str) -> Decimal {
    data.get(key)
        .and_then(decimal)
        .filter(|value| value.is_sign_positive())
        .unwrap_or(Decimal::ZERO)
}

/// A non-negative whole count. Fractions are floored; missing, non-numeric
/// and negative values become 0.
#[must_use]
pub fn count(data: &Record, key: &str) -> u32 {
    let value = amount(data, key).floor();
    value.to_u32().unwrap_or(if value > Decimal::ZERO { u32::MAX } else { 0 })
}

/// A timestamp stored either as `{seconds, nanoseconds}` or as an RFC 3339
/// string.
#[must_use]
pub fn timestamp(data: &Record, key: &str) -> Option<DateTime<Utc>> {
    match data.get(key)? {
        Value::Object(ts) => {
            let seconds = ts
                .get("seconds")
                .or_else(|| ts.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = ts
                .get("nanoseconds")
                .or_else(|| ts.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

//! Lenient numeric input
//!
//! Form state arrives loosely typed. Numbers may be real numbers, strings,
//! blanks or garbage. Everything that is not a finite number becomes zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a form string into a number, zero when unparsable.
///
/// A comma is accepted as decimal separator when no dot is present.
pub fn parse_f64(raw: &str) -> f64 {
    if raw.trim().is_empty() {
        return 0.0;
    }
    parse_finite(raw).unwrap_or_else(|| {
        tracing::debug!(input = raw, "unparsable number defaulted to zero");
        0.0
    })
}

fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an arbitrary JSON value into a number.
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_f64(s),
        _ => 0.0,
    }
}

/// `deserialize_with` helper: any JSON value, zero when not numeric.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

/// `deserialize_with` helper for optional numbers.
///
/// Anything that is not a finite number, or a string holding one, is `None`.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_finite(&s),
        _ => None,
    })
}

/// `deserialize_with` helper for lists: `null` or a non-array is empty,
/// and items that fail to decode are dropped.
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(error = %e, "dropped undecodable list item");
                None
            }
        })
        .collect())
}

/// `deserialize_with` helper: the decoded value, or `T::default()` when the
/// input is `null` or does not decode.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

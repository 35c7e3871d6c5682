//! Lenient numeric ingestion.
//!
//! Persisted risk rows and form payloads carry FAIR factors either as JSON
//! numbers or as decimal strings (`"5000.00"`). Everything is parsed to `f64`
//! exactly once, here, at the boundary; missing, null, or unparseable values
//! become `0.0` so the calculation pipeline never sees a NaN.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Replace NaN and infinities with zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parse a decimal string, trying exact decimal notation, then scientific
/// notation, then plain float parsing.
pub fn parse_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .and_then(|d| d.to_f64())
        .or_else(|| trimmed.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Interpret a JSON value as a number if it is one (or a numeric string).
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

/// Interpret a JSON value as a number, defaulting to `0.0`.
pub fn parse_lenient(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        other => as_number(other).unwrap_or_else(|| {
            warn!(value = %other, "Non-numeric value in numeric field, using 0");
            0.0
        }),
    }
}

/// `deserialize_with` helper: number, numeric string, or null into `f64`.
pub fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(parse_lenient).unwrap_or(0.0))
}

/// `deserialize_with` helper for fields where absence is meaningful.
///
/// Null and missing stay `None`; present-but-unparseable values also become
/// `None` so callers can treat the record as malformed.
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(as_number))
}

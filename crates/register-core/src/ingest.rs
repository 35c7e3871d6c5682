//! Lenient deserializers for non-numeric record fields.
//!
//! A malformed identifier, list, or timestamp degrades to an empty value with
//! a warning instead of rejecting the whole record (or the list it sits in).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

fn parse_uuid(value: &Value) -> Option<Uuid> {
    match value {
        Value::Null => None,
        Value::String(s) => Uuid::parse_str(s.trim()).ok().or_else(|| {
            warn!(value = %s, "Malformed identifier, ignoring");
            None
        }),
        other => {
            warn!(value = %other, "Non-string identifier, ignoring");
            None
        }
    }
}

/// `deserialize_with` helper: a UUID string, or nil for anything else.
pub fn uuid_or_nil<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_uuid).unwrap_or_else(Uuid::nil))
}

/// `deserialize_with` helper: a UUID string, or `None` for anything else.
pub fn uuid_opt<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_uuid))
}

/// `deserialize_with` helper: a list of identifiers.
///
/// Null or a non-list is empty. Numeric entries are kept as their text;
/// other entries are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Null => None,
                other => {
                    warn!(value = %other, "Non-string list entry, skipping");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(value = %other, "Expected a list, using an empty one");
            Vec::new()
        }
    })
}

/// `deserialize_with` helper: text, with null and non-strings as empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// `deserialize_with` helper: an RFC 3339 timestamp, or `None`.
pub fn timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s.trim()) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %s, error = %e, "Malformed timestamp, ignoring");
                None
            }
        },
        _ => None,
    })
}

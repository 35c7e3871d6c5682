//! Security controls as read by the engine.

use crate::ingest::uuid_opt;
use crate::numeric::lenient_opt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Deployment state of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    NotImplemented,
    InProgress,
    FullyImplemented,
    Planned,
}

impl ImplementationStatus {
    /// Parse a status tag; unknown tags count as `NotImplemented`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "fully_implemented" | "implemented" => Self::FullyImplemented,
            "in_progress" => Self::InProgress,
            "planned" => Self::Planned,
            _ => Self::NotImplemented,
        }
    }

    /// Share of a control's rated effectiveness that actually applies.
    pub fn factor(&self) -> f64 {
        match self {
            Self::FullyImplemented => 1.0,
            Self::InProgress => 0.5,
            Self::NotImplemented | Self::Planned => 0.0,
        }
    }
}

impl<'de> Deserialize<'de> for ImplementationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw {
            Value::String(s) => Self::parse(&s),
            _ => Self::NotImplemented,
        })
    }
}

/// A control linked to a risk.
///
/// Both fields are optional on the wire; records missing either are skipped
/// by the effectiveness aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    #[serde(default, deserialize_with = "uuid_opt")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    /// Rated effectiveness on a 0-10 scale.
    #[serde(default, deserialize_with = "lenient_opt")]
    pub effectiveness: Option<f64>,
    #[serde(default)]
    pub implementation_status: Option<ImplementationStatus>,
}

impl Control {
    pub fn new(effectiveness: f64, status: ImplementationStatus) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            name: None,
            effectiveness: Some(effectiveness),
            implementation_status: Some(status),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

//! Cost modules: typed rules that price the secondary loss of an event.

use crate::ingest::uuid_or_nil;
use crate::numeric::lenient_opt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// How a cost module's value turns into a per-event cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CostModuleType {
    /// Flat cost per event.
    Fixed,
    /// Cost incurred once per event.
    PerEvent,
    /// Hourly cost, multiplied by the assumed hours per event.
    PerHour,
    /// Fraction of the reference loss magnitude (0.1 = 10%).
    Percent,
}

impl CostModuleType {
    /// Parse a type tag, accepting camelCase and snake_case spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fixed" => Some(Self::Fixed),
            "perevent" | "per_event" => Some(Self::PerEvent),
            "perhour" | "per_hour" => Some(Self::PerHour),
            "percent" | "percentage" => Some(Self::Percent),
            _ => None,
        }
    }
}

/// Unknown or non-string tags deserialize to `None` so the record can be
/// skipped individually instead of failing the whole list.
fn lenient_type<'de, D>(deserializer: D) -> Result<Option<CostModuleType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => CostModuleType::parse(&s),
        _ => None,
    })
}

/// One component of secondary-loss cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostModule {
    #[serde(default, deserialize_with = "uuid_or_nil")]
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub module_type: Option<CostModuleType>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub value: Option<f64>,
}

impl CostModule {
    pub fn new(module_type: CostModuleType, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            module_type: Some(module_type),
            value: Some(value),
        }
    }

    pub fn fixed(value: f64) -> Self {
        Self::new(CostModuleType::Fixed, value)
    }

    pub fn per_event(value: f64) -> Self {
        Self::new(CostModuleType::PerEvent, value)
    }

    pub fn per_hour(value: f64) -> Self {
        Self::new(CostModuleType::PerHour, value)
    }

    pub fn percent(value: f64) -> Self {
        Self::new(CostModuleType::Percent, value)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Links a risk to a cost module with a materiality weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostModuleAssignment {
    #[serde(default)]
    pub cost_module: Option<CostModule>,
    /// Scaling applied to the module's contribution; `None` means 1.
    #[serde(default, deserialize_with = "lenient_opt")]
    pub materiality_weight: Option<f64>,
}

impl CostModuleAssignment {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(cost_module: CostModule) -> Self {
        Self {
            cost_module: Some(cost_module),
            materiality_weight: None,
        }
    }

    pub fn weighted(cost_module: CostModule, weight: f64) -> Self {
        Self {
            cost_module: Some(cost_module),
            materiality_weight: Some(weight),
        }
    }

    /// Weight to apply; missing, negative, or non-finite weights fall back to 1.
    pub fn weight(&self) -> f64 {
        match self.materiality_weight {
            Some(w) if w.is_finite() && w >= 0.0 => w,
            _ => Self::DEFAULT_WEIGHT,
        }
    }
}

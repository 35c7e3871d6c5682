//! Assets owned by the external asset registry.

use crate::ingest::uuid_or_nil;
use crate::numeric::lenient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_currency() -> String {
    "USD".to_string()
}

/// A registered asset whose monetary value drives asset-derived primary loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, deserialize_with = "uuid_or_nil")]
    pub id: Uuid,
    /// Human-facing asset identifier (e.g. `"AST-0042"`).
    pub asset_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Asset {
    pub fn new(asset_id: impl Into<String>, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset_id.into(),
            value,
            currency: default_currency(),
        }
    }

    /// Monetary value usable in loss derivation (negative values count as 0).
    pub fn effective_value(&self) -> f64 {
        if self.value.is_finite() && self.value > 0.0 {
            self.value
        } else {
            0.0
        }
    }
}

/// Total monetary value of a set of assets.
pub fn total_asset_value(assets: &[Asset]) -> f64 {
    assets.iter().map(Asset::effective_value).sum()
}

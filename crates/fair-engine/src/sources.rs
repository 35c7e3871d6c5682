//! Host-provided lookups the engine reads assets, controls, and cost modules
//! through.

use register_core::types::{Asset, Control, CostModuleAssignment};
use register_core::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Resolves asset identifiers to registered assets.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AssetLookup: Send + Sync {
    /// Unknown identifiers are omitted from the result.
    async fn assets_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
}

/// Fetches the controls linked to a risk.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ControlLookup: Send + Sync {
    async fn controls_for_risk(&self, risk_id: Uuid) -> Result<Vec<Control>>;
}

/// Fetches the weighted cost modules assigned to a risk.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CostModuleLookup: Send + Sync {
    async fn assignments_for_risk(&self, risk_id: Uuid) -> Result<Vec<CostModuleAssignment>>;
}

/// In-memory sources for tests and offline evaluation.
#[derive(Clone, Default)]
pub struct InMemorySources {
    assets: Arc<RwLock<HashMap<String, Asset>>>,
    controls: Arc<RwLock<HashMap<Uuid, Vec<Control>>>>,
    cost_modules: Arc<RwLock<HashMap<Uuid, Vec<CostModuleAssignment>>>>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_asset(&self, asset: Asset) {
        self.assets
            .write()
            .await
            .insert(asset.asset_id.clone(), asset);
    }

    pub async fn set_controls(&self, risk_id: Uuid, controls: Vec<Control>) {
        self.controls.write().await.insert(risk_id, controls);
    }

    pub async fn set_cost_modules(&self, risk_id: Uuid, assignments: Vec<CostModuleAssignment>) {
        self.cost_modules.write().await.insert(risk_id, assignments);
    }
}

#[async_trait::async_trait]
impl AssetLookup for InMemorySources {
    async fn assets_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let assets = self.assets.read().await;
        Ok(asset_ids
            .iter()
            .filter_map(|id| assets.get(id).cloned())
            .collect())
    }
}

#[async_trait::async_trait]
impl ControlLookup for InMemorySources {
    async fn controls_for_risk(&self, risk_id: Uuid) -> Result<Vec<Control>> {
        Ok(self
            .controls
            .read()
            .await
            .get(&risk_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl CostModuleLookup for InMemorySources {
    async fn assignments_for_risk(&self, risk_id: Uuid) -> Result<Vec<CostModuleAssignment>> {
        Ok(self
            .cost_modules
            .read()
            .await
            .get(&risk_id)
            .cloned()
            .unwrap_or_default())
    }
}

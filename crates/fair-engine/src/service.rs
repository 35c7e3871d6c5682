//! Recalculation service: cache policy, input assembly, and the engine.

use crate::cache_policy::{CacheDecision, CachePolicy};
use crate::change_detector::ParameterChangeDetector;
use crate::composer::RiskEngine;
use crate::sources::{AssetLookup, ControlLookup, CostModuleLookup};
use anyhow::{Context, Result};
use register_core::config::EngineConfig;
use register_core::types::{RiskCalculationInput, RiskCalculationResult, RiskRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a recalculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOutcome {
    pub decision: CacheDecision,
    pub result: RiskCalculationResult,
}

impl RiskOutcome {
    /// Whether the caller should persist `result` over the stored values.
    pub fn should_persist(&self) -> bool {
        self.decision == CacheDecision::Recompute
    }
}

/// Recalculates risks on demand for the host application.
///
/// Holds no per-risk state. Concurrent recalculations of the same risk are
/// last-write-wins at the caller's persistence layer; callers needing strict
/// consistency must serialize writes per risk id.
pub struct RiskRecalculator {
    engine: RiskEngine,
    policy: CachePolicy,
    assets: Arc<dyn AssetLookup>,
    controls: Arc<dyn ControlLookup>,
    cost_modules: Arc<dyn CostModuleLookup>,
}

impl RiskRecalculator {
    pub fn new(
        config: EngineConfig,
        assets: Arc<dyn AssetLookup>,
        controls: Arc<dyn ControlLookup>,
        cost_modules: Arc<dyn CostModuleLookup>,
    ) -> Self {
        let policy = CachePolicy::new(ParameterChangeDetector::new(config.change_epsilon));
        Self {
            engine: RiskEngine::new(config),
            policy,
            assets,
            controls,
            cost_modules,
        }
    }

    /// Use a pre-built engine (e.g. one with a custom primary loss estimator).
    pub fn with_engine(mut self, engine: RiskEngine) -> Self {
        let detector = ParameterChangeDetector::new(engine.config().change_epsilon);
        self.policy = CachePolicy::new(detector);
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Fetch everything a calculation needs for `record`.
    pub async fn assemble_input(&self, record: &RiskRecord) -> Result<RiskCalculationInput> {
        let assets = self
            .assets
            .assets_by_ids(&record.associated_assets)
            .await
            .with_context(|| format!("Failed to fetch assets for risk {}", record.id))?;

        if assets.len() < record.associated_assets.len() {
            warn!(
                risk_id = %record.id,
                requested = record.associated_assets.len(),
                found = assets.len(),
                "Some associated assets were not found"
            );
        }

        let controls = self
            .controls
            .controls_for_risk(record.id)
            .await
            .with_context(|| format!("Failed to fetch controls for risk {}", record.id))?;

        let cost_modules = self
            .cost_modules
            .assignments_for_risk(record.id)
            .await
            .with_context(|| format!("Failed to fetch cost modules for risk {}", record.id))?;

        debug!(
            risk_id = %record.id,
            assets = assets.len(),
            controls = controls.len(),
            cost_modules = cost_modules.len(),
            "Assembled calculation input"
        );

        Ok(RiskCalculationInput::new(record.factors())
            .with_severity(record.severity)
            .with_assets(assets)
            .with_controls(controls)
            .with_cost_modules(cost_modules))
    }

    /// Apply the cache policy and, when required, run the full calculation.
    ///
    /// `original` is the stored record before the edit, if any.
    pub async fn recalculate(
        &self,
        original: Option<&RiskRecord>,
        current: &RiskRecord,
    ) -> Result<RiskOutcome> {
        let decision = self.policy.evaluate(original, current);
        let prior = CachePolicy::prior_for(original, current);

        info!(risk_id = %current.id, decision = ?decision, "Risk cache decision");

        let result = match decision {
            CacheDecision::Recompute => {
                let input = self.assemble_input(current).await?;
                self.engine.calculate_risk(&input)
            }
            other => other.resolve(prior, RiskCalculationResult::zero),
        };

        Ok(RiskOutcome { decision, result })
    }
}

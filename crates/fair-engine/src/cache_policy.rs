//! Decides whether a stored risk calculation can be reused.

use crate::change_detector::ParameterChangeDetector;
use register_core::types::{PriorRisk, RiskCalculationResult, RiskRecord};
use serde::{Deserialize, Serialize};

/// What to do with a risk's stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDecision {
    /// No assets and nothing stored: every output is zero.
    Zeroed,
    /// Assets were removed but stored values exist: keep them.
    PreservedPrior,
    /// Inputs unchanged and a non-zero value is stored: reuse it.
    CacheHit,
    /// Run the full pipeline and overwrite whatever is stored.
    Recompute,
}

impl CacheDecision {
    /// Apply the decision pure-functionally; `compute` runs only on
    /// `Recompute`.
    pub fn resolve(
        self,
        prior: PriorRisk,
        compute: impl FnOnce() -> RiskCalculationResult,
    ) -> RiskCalculationResult {
        match self {
            Self::Zeroed => RiskCalculationResult::zero(),
            Self::PreservedPrior | Self::CacheHit => RiskCalculationResult::from_prior(prior),
            Self::Recompute => compute(),
        }
    }
}

/// Core rule table.
pub fn decide(has_assets: bool, prior: PriorRisk, changed: bool) -> CacheDecision {
    match (has_assets, prior.exists(), changed) {
        (false, false, _) => CacheDecision::Zeroed,
        (false, true, _) => CacheDecision::PreservedPrior,
        (true, true, false) => CacheDecision::CacheHit,
        (true, _, _) => CacheDecision::Recompute,
    }
}

/// Cache policy over persisted risk records.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachePolicy {
    detector: ParameterChangeDetector,
}

impl CachePolicy {
    pub fn new(detector: ParameterChangeDetector) -> Self {
        Self { detector }
    }

    /// Stored values come from `original` when present, otherwise from
    /// `current`. Without an original there is nothing to compare, so any
    /// risk with assets is recomputed.
    pub fn prior_for(original: Option<&RiskRecord>, current: &RiskRecord) -> PriorRisk {
        original.unwrap_or(current).prior_risk()
    }

    pub fn evaluate(&self, original: Option<&RiskRecord>, current: &RiskRecord) -> CacheDecision {
        let prior = Self::prior_for(original, current);
        let changed = match original {
            Some(original) => self
                .detector
                .has_changed(&original.snapshot(), &current.snapshot()),
            None => true,
        };
        decide(current.has_assets(), prior, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior(inherent: f64, residual: f64) -> PriorRisk {
        PriorRisk {
            inherent_risk: inherent,
            residual_risk: residual,
        }
    }

    fn record_with_assets(assets: &[&str]) -> RiskRecord {
        RiskRecord {
            associated_assets: assets.iter().map(|s| s.to_string()).collect(),
            contact_frequency_avg: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_rule_table() {
        assert_eq!(decide(false, PriorRisk::default(), true), CacheDecision::Zeroed);
        assert_eq!(decide(false, prior(50000.0, 0.0), true), CacheDecision::PreservedPrior);
        assert_eq!(decide(true, prior(1.0, 1.0), false), CacheDecision::CacheHit);
        assert_eq!(decide(true, prior(1.0, 1.0), true), CacheDecision::Recompute);
        assert_eq!(decide(true, PriorRisk::default(), false), CacheDecision::Recompute);
    }

    #[test]
    fn test_resolve_only_computes_on_recompute() {
        let stored = prior(50000.0, 20000.0);

        let zero = CacheDecision::Zeroed.resolve(stored, || panic!("should not compute"));
        assert!(zero.is_zero());

        let kept = CacheDecision::PreservedPrior.resolve(stored, || panic!("should not compute"));
        assert_eq!(kept.inherent_risk, 50000.0);
        assert_eq!(kept.residual_risk, 20000.0);

        let fresh = CacheDecision::Recompute.resolve(stored, || RiskCalculationResult {
            inherent_risk: 1.0,
            ..Default::default()
        });
        assert_eq!(fresh.inherent_risk, 1.0);
    }

    #[test]
    fn test_unchanged_record_with_stored_risk_hits_cache() {
        let mut original = record_with_assets(&["AST-1"]);
        original.inherent_risk = Some(1000.0);
        original.residual_risk = Some(600.0);
        let mut current = original.clone();
        current.title = "Renamed".to_string();

        let policy = CachePolicy::default();
        assert_eq!(policy.evaluate(Some(&original), &current), CacheDecision::CacheHit);
    }

    #[test]
    fn test_changed_record_recomputes() {
        let mut original = record_with_assets(&["AST-1"]);
        original.inherent_risk = Some(1000.0);
        let mut current = original.clone();
        current.contact_frequency_avg = 6.0;

        let policy = CachePolicy::default();
        assert_eq!(policy.evaluate(Some(&original), &current), CacheDecision::Recompute);
    }

    #[test]
    fn test_assets_removed_preserves_prior() {
        let mut original = record_with_assets(&["AST-1"]);
        original.inherent_risk = Some(50000.0);
        let mut current = original.clone();
        current.associated_assets.clear();

        let policy = CachePolicy::default();
        assert_eq!(
            policy.evaluate(Some(&original), &current),
            CacheDecision::PreservedPrior
        );
    }

    #[test]
    fn test_no_original_recomputes_when_assets_exist() {
        let current = record_with_assets(&["AST-1"]);
        assert_eq!(CachePolicy::default().evaluate(None, &current), CacheDecision::Recompute);

        let bare = RiskRecord::default();
        assert_eq!(CachePolicy::default().evaluate(None, &bare), CacheDecision::Zeroed);
    }
}

//! Loss magnitude: primary loss (direct or asset-derived), secondary loss
//! (cost modules or direct SLEF x SLM), and their combination.

use register_core::config::{EngineConfig, Envelope};
use register_core::types::{
    total_asset_value, Asset, Bound, CostModuleAssignment, CostModuleType,
    RiskCalculationInput, Severity, TriangularValue,
};
use tracing::{debug, warn};

/// Derives primary loss from a risk's associated assets.
pub trait PrimaryLossEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn estimate(&self, assets: &[Asset], severity: Severity) -> TriangularValue;
}

/// Scales total asset value by a severity-indexed impact factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityImpactEstimator;

/// Fraction of total asset value lost at each bound, by severity.
pub fn impact_factors(severity: Severity) -> Envelope {
    match severity {
        Severity::Critical => Envelope::new(0.2, 0.5, 0.8),
        Severity::High => Envelope::new(0.1, 0.3, 0.6),
        Severity::Medium | Severity::Low => Envelope::new(0.05, 0.15, 0.3),
    }
}

impl PrimaryLossEstimator for SeverityImpactEstimator {
    fn name(&self) -> &'static str {
        "severity_impact"
    }

    fn estimate(&self, assets: &[Asset], severity: Severity) -> TriangularValue {
        let total = total_asset_value(assets);
        let factors = impact_factors(severity);
        TriangularValue::from_bounds(|b| total * factors.get(b))
    }
}

/// A cost module that passed validation, ready to price.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PricedModule {
    kind: CostModuleType,
    value: f64,
    weight: f64,
}

impl PricedModule {
    fn cost(&self, reference_loss: f64, hours_per_event: f64) -> f64 {
        let raw = match self.kind {
            CostModuleType::Fixed | CostModuleType::PerEvent => self.value,
            CostModuleType::PerHour => self.value * hours_per_event,
            CostModuleType::Percent => reference_loss * self.value,
        };
        raw * self.weight
    }
}

/// Keep assignments with a module, a known type, and a finite non-negative
/// value. Everything else is logged and dropped.
fn priced_modules(assignments: &[CostModuleAssignment]) -> Vec<PricedModule> {
    assignments
        .iter()
        .enumerate()
        .filter_map(|(index, assignment)| {
            let Some(module) = assignment.cost_module.as_ref() else {
                warn!(index, "Cost module assignment has no module, skipping");
                return None;
            };
            let Some(kind) = module.module_type else {
                warn!(index, module_id = %module.id, "Cost module has no valid type, skipping");
                return None;
            };
            let value = match module.value {
                Some(v) if v.is_finite() && v >= 0.0 => v,
                other => {
                    warn!(
                        index,
                        module_id = %module.id,
                        value = ?other,
                        "Cost module has no usable value, skipping"
                    );
                    return None;
                }
            };
            Some(PricedModule {
                kind,
                value,
                weight: assignment.weight(),
            })
        })
        .collect()
}

fn sum_costs(modules: &[PricedModule], reference_loss: f64, hours_per_event: f64) -> f64 {
    modules
        .iter()
        .map(|m| m.cost(reference_loss, hours_per_event))
        .sum()
}

/// Weighted per-event cost of a set of cost modules, given the reference
/// loss magnitude that `percent` modules apply to.
pub fn per_event_cost(
    assignments: &[CostModuleAssignment],
    reference_loss: f64,
    hours_per_event: f64,
) -> f64 {
    sum_costs(&priced_modules(assignments), reference_loss, hours_per_event)
}

/// Secondary loss for each bound.
///
/// Without usable cost modules this is `event_frequency * loss_magnitude`.
/// With cost modules, `loss_magnitude` is the reference loss for `percent`
/// modules and the result is `per_event_cost * event_frequency`.
pub fn calculate_secondary_loss(
    event_frequency: &TriangularValue,
    loss_magnitude: &TriangularValue,
    cost_modules: &[CostModuleAssignment],
    hours_per_event: Option<f64>,
) -> TriangularValue {
    let hours = hours_per_event.unwrap_or(EngineConfig::default().hours_per_event);
    secondary_from_modules(
        event_frequency,
        loss_magnitude,
        &priced_modules(cost_modules),
        hours,
    )
}

fn secondary_from_modules(
    event_frequency: &TriangularValue,
    loss_magnitude: &TriangularValue,
    modules: &[PricedModule],
    hours_per_event: f64,
) -> TriangularValue {
    if modules.is_empty() {
        return event_frequency.times(loss_magnitude);
    }

    TriangularValue::from_bounds(|b| {
        sum_costs(modules, loss_magnitude.get(b), hours_per_event) * event_frequency.get(b)
    })
    .with_confidence(loss_magnitude.confidence)
}

/// Loss components for one risk.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LossBreakdown {
    pub primary: TriangularValue,
    pub secondary: TriangularValue,
    /// `primary + secondary` at each bound.
    pub total: TriangularValue,
    /// Back-derived secondary magnitude when cost modules priced the
    /// secondary loss; otherwise the directly entered SLM.
    pub secondary_magnitude: TriangularValue,
    pub used_cost_modules: bool,
}

/// Resolves primary and secondary loss for a calculation input.
pub struct LossMagnitudePipeline<'a> {
    config: &'a EngineConfig,
    estimator: &'a dyn PrimaryLossEstimator,
}

impl<'a> LossMagnitudePipeline<'a> {
    pub fn new(config: &'a EngineConfig, estimator: &'a dyn PrimaryLossEstimator) -> Self {
        Self { config, estimator }
    }

    /// Asset-derived when the risk has assets, otherwise the entered values.
    pub fn primary_loss(&self, input: &RiskCalculationInput) -> TriangularValue {
        if input.assets.is_empty() {
            return input.factors.primary_loss_magnitude;
        }

        let estimate = self.estimator.estimate(&input.assets, input.severity);
        debug!(
            estimator = self.estimator.name(),
            asset_count = input.assets.len(),
            primary_avg = estimate.avg,
            "Derived primary loss from assets"
        );
        estimate.with_confidence(input.factors.primary_loss_magnitude.confidence)
    }

    /// Frequency envelope applied to cost-module secondary loss.
    fn cost_module_frequency(&self, input: &RiskCalculationInput) -> TriangularValue {
        match input.factors.secondary_loss_event_frequency {
            Some(slef) if !slef.is_zero() => slef,
            _ => {
                let d = self.config.default_secondary_frequency;
                TriangularValue::new(d.min, d.avg, d.max)
            }
        }
    }

    fn breakdown(
        &self,
        input: &RiskCalculationInput,
        assignments: &[CostModuleAssignment],
    ) -> LossBreakdown {
        let primary = self.primary_loss(input);
        let modules = priced_modules(assignments);

        if modules.is_empty() {
            let slef = input
                .factors
                .secondary_loss_event_frequency
                .unwrap_or_default();
            let slm = input.factors.secondary_loss_magnitude;
            let secondary = slef.times(&slm);
            return LossBreakdown {
                primary,
                secondary,
                total: primary.plus(&secondary),
                secondary_magnitude: slm,
                used_cost_modules: false,
            };
        }

        let frequency = self.cost_module_frequency(input);
        let secondary =
            secondary_from_modules(&frequency, &primary, &modules, self.config.hours_per_event);
        let total = primary.plus(&secondary);

        debug!(
            module_count = modules.len(),
            secondary_avg = secondary.avg,
            "Priced secondary loss from cost modules"
        );

        LossBreakdown {
            primary,
            secondary,
            total,
            secondary_magnitude: total
                .zip_with(&primary, |t, p| t - p)
                .with_confidence(primary.confidence),
            used_cost_modules: true,
        }
    }

    /// Full loss breakdown using the input's own cost-module assignments.
    pub fn evaluate(&self, input: &RiskCalculationInput) -> LossBreakdown {
        self.breakdown(input, &input.cost_module_assignments)
    }

    /// Total loss magnitude at one bound, priced with the given assignments.
    pub fn loss_at(
        &self,
        input: &RiskCalculationInput,
        bound: Bound,
        assignments: &[CostModuleAssignment],
    ) -> f64 {
        self.breakdown(input, assignments).total.get(bound)
    }
}

/// Total loss magnitude at one bound with default configuration.
pub fn calculate_loss_magnitude(
    input: &RiskCalculationInput,
    bound: Bound,
    assignments: &[CostModuleAssignment],
) -> f64 {
    let config = EngineConfig::default();
    LossMagnitudePipeline::new(&config, &SeverityImpactEstimator).loss_at(input, bound, assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use register_core::types::{CostModule, FairFactors};

    const EPS: f64 = 1e-9;

    fn direct_input() -> RiskCalculationInput {
        RiskCalculationInput::new(FairFactors {
            primary_loss_magnitude: TriangularValue::new(1000.0, 5000.0, 10000.0),
            secondary_loss_event_frequency: Some(TriangularValue::new(0.1, 0.3, 0.5)),
            secondary_loss_magnitude: TriangularValue::new(5000.0, 25000.0, 50000.0),
            ..Default::default()
        })
    }

    #[test]
    fn test_module_costs_by_type() {
        let cost = |module: CostModule| {
            per_event_cost(&[CostModuleAssignment::new(module)], 1000.0, 8.0)
        };
        assert_eq!(cost(CostModule::fixed(250.0)), 250.0);
        assert_eq!(cost(CostModule::per_event(40.0)), 40.0);
        assert_eq!(cost(CostModule::per_hour(100.0)), 800.0);
        assert_eq!(cost(CostModule::percent(0.1)), 100.0);
    }

    #[test]
    fn test_materiality_weight_scales_contribution() {
        let assignments = vec![
            CostModuleAssignment::weighted(CostModule::fixed(1000.0), 0.5),
            CostModuleAssignment::new(CostModule::per_hour(10.0)),
        ];
        assert!((per_event_cost(&assignments, 0.0, 4.0) - 540.0).abs() < EPS);
    }

    #[test]
    fn test_malformed_modules_are_skipped() {
        let mut untyped = CostModule::fixed(999.0);
        untyped.module_type = None;
        let mut valueless = CostModule::fixed(999.0);
        valueless.value = None;

        let assignments = vec![
            CostModuleAssignment {
                cost_module: None,
                materiality_weight: None,
            },
            CostModuleAssignment::new(untyped),
            CostModuleAssignment::new(valueless),
            CostModuleAssignment::new(CostModule::fixed(-10.0)),
            CostModuleAssignment::new(CostModule::fixed(75.0)),
        ];
        assert_eq!(per_event_cost(&assignments, 1000.0, 8.0), 75.0);
    }

    #[test]
    fn test_direct_secondary_loss() {
        let secondary = calculate_secondary_loss(
            &TriangularValue::new(0.1, 0.3, 0.5),
            &TriangularValue::new(5000.0, 25000.0, 50000.0),
            &[],
            None,
        );
        assert!((secondary.min - 500.0).abs() < EPS);
        assert!((secondary.avg - 7500.0).abs() < EPS);
        assert!((secondary.max - 25000.0).abs() < EPS);
    }

    #[test]
    fn test_cost_module_secondary_loss() {
        let secondary = calculate_secondary_loss(
            &TriangularValue::new(0.1, 0.3, 0.7),
            &TriangularValue::new(1000.0, 5000.0, 10000.0),
            &[
                CostModuleAssignment::new(CostModule::percent(0.1)),
                CostModuleAssignment::new(CostModule::per_hour(50.0)),
            ],
            Some(2.0),
        );
        // (0.1 * m + 100) * f
        assert!((secondary.min - 20.0).abs() < EPS);
        assert!((secondary.avg - 180.0).abs() < EPS);
        assert!((secondary.max - 770.0).abs() < EPS);
    }

    #[test]
    fn test_direct_breakdown() {
        let config = EngineConfig::default();
        let pipeline = LossMagnitudePipeline::new(&config, &SeverityImpactEstimator);
        let loss = pipeline.evaluate(&direct_input());

        assert!(!loss.used_cost_modules);
        assert!((loss.secondary.avg - 7500.0).abs() < EPS);
        assert!((loss.total.avg - 12500.0).abs() < EPS);
        assert_eq!(loss.secondary_magnitude.avg, 25000.0);
    }

    #[test]
    fn test_cost_modules_use_default_frequency_without_slef() {
        let mut input = direct_input()
            .with_cost_modules(vec![CostModuleAssignment::new(CostModule::fixed(1000.0))]);
        input.factors.secondary_loss_event_frequency = None;

        let config = EngineConfig::default();
        let pipeline = LossMagnitudePipeline::new(&config, &SeverityImpactEstimator);
        let loss = pipeline.evaluate(&input);

        assert!(loss.used_cost_modules);
        assert!((loss.secondary.min - 100.0).abs() < EPS);
        assert!((loss.secondary.avg - 300.0).abs() < EPS);
        assert!((loss.secondary.max - 700.0).abs() < EPS);
        assert!((loss.secondary_magnitude.avg - 300.0).abs() < EPS);
        assert!((loss.total.avg - 5300.0).abs() < EPS);
    }

    #[test]
    fn test_cost_modules_use_explicit_slef() {
        let input = direct_input()
            .with_cost_modules(vec![CostModuleAssignment::new(CostModule::fixed(1000.0))]);
        let loss = calculate_loss_magnitude(&input, Bound::Max, &input.cost_module_assignments);
        assert!((loss - (10000.0 + 500.0)).abs() < EPS);
    }

    #[test]
    fn test_percent_module_contribution_at_bound() {
        let mut input = direct_input();
        input.factors.primary_loss_magnitude = TriangularValue::constant(1000.0);
        input.factors.secondary_loss_event_frequency = Some(TriangularValue::constant(1.0));

        let assignments = vec![CostModuleAssignment::new(CostModule::percent(0.1))];
        let loss = calculate_loss_magnitude(&input, Bound::Avg, &assignments);
        assert!((loss - 1100.0).abs() < EPS);
    }

    #[test]
    fn test_all_malformed_modules_fall_back_to_direct() {
        let mut broken = CostModule::fixed(1.0);
        broken.module_type = None;
        let input = direct_input().with_cost_modules(vec![CostModuleAssignment::new(broken)]);

        let config = EngineConfig::default();
        let loss = LossMagnitudePipeline::new(&config, &SeverityImpactEstimator).evaluate(&input);
        assert!(!loss.used_cost_modules);
        assert!((loss.total.avg - 12500.0).abs() < EPS);
    }

    #[test]
    fn test_asset_derived_primary_loss() {
        let input = direct_input()
            .with_assets(vec![Asset::new("a", 60000.0), Asset::new("b", 40000.0)])
            .with_severity(Severity::Critical);

        let config = EngineConfig::default();
        let primary =
            LossMagnitudePipeline::new(&config, &SeverityImpactEstimator).primary_loss(&input);
        assert!((primary.min - 20000.0).abs() < EPS);
        assert!((primary.avg - 50000.0).abs() < EPS);
        assert!((primary.max - 80000.0).abs() < EPS);
    }

    #[test]
    fn test_impact_factors_by_severity() {
        assert_eq!(impact_factors(Severity::High), Envelope::new(0.1, 0.3, 0.6));
        assert_eq!(impact_factors(Severity::Medium), Envelope::new(0.05, 0.15, 0.3));
        assert_eq!(impact_factors(Severity::Low), impact_factors(Severity::Medium));
    }

    struct FlatEstimator;

    impl PrimaryLossEstimator for FlatEstimator {
        fn name(&self) -> &'static str {
            "flat"
        }

        fn estimate(&self, assets: &[Asset], _severity: Severity) -> TriangularValue {
            TriangularValue::constant(assets.len() as f64)
        }
    }

    #[test]
    fn test_custom_estimator_is_used() {
        let input = direct_input().with_assets(vec![Asset::new("a", 1.0), Asset::new("b", 1.0)]);
        let config = EngineConfig::default();
        let primary = LossMagnitudePipeline::new(&config, &FlatEstimator).primary_loss(&input);
        assert_eq!(primary.avg, 2.0);
    }
}

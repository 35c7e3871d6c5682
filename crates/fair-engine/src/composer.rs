//! Composes the frequency, loss, and control pipelines into inherent and
//! residual risk.

use crate::controls::{assess_controls, residual_risk};
use crate::frequency::FrequencyProfile;
use crate::loss_magnitude::{LossMagnitudePipeline, PrimaryLossEstimator, SeverityImpactEstimator};
use crate::susceptibility::{susceptibility, susceptibility_envelope};
use register_core::config::EngineConfig;
use register_core::numeric::sanitize;
use register_core::types::{
    Bound, CostModuleAssignment, MonteCarloSummary, RiskCalculationInput, RiskCalculationResult,
};
use tracing::debug;

/// Stateless risk calculator. Identical input always yields identical output.
pub struct RiskEngine {
    config: EngineConfig,
    estimator: Box<dyn PrimaryLossEstimator>,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            estimator: Box::new(SeverityImpactEstimator),
        }
    }

    /// Replace the asset-derived primary loss estimator.
    pub fn with_estimator(mut self, estimator: Box<dyn PrimaryLossEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn loss_pipeline(&self) -> LossMagnitudePipeline<'_> {
        LossMagnitudePipeline::new(&self.config, self.estimator.as_ref())
    }

    /// Run the full pipeline.
    pub fn calculate_risk(&self, input: &RiskCalculationInput) -> RiskCalculationResult {
        let factors = &input.factors;

        let envelope =
            susceptibility_envelope(&factors.threat_capability, &factors.resistance_strength);
        let frequency = FrequencyProfile::compute(factors, &envelope);
        let loss = self.loss_pipeline().evaluate(input);

        let inherent_risk = inherent_risk(input, loss.total.avg);

        let assessment =
            assess_controls(&input.controls, &factors.resistance_strength, &self.config);
        let residual_risk = sanitize(residual_risk(inherent_risk, &assessment, &self.config));

        debug!(
            inherent_risk,
            residual_risk,
            susceptibility = envelope.avg,
            lef_avg = frequency.loss_event_frequency.avg,
            loss_avg = loss.total.avg,
            controls = assessment.valid_controls,
            "Calculated risk"
        );

        RiskCalculationResult {
            inherent_risk,
            residual_risk,
            susceptibility: envelope.avg,
            susceptibility_envelope: envelope,
            threat_event_frequency: frequency.threat_event_frequency,
            loss_event_frequency: frequency.loss_event_frequency,
            primary_loss: loss.primary,
            loss_magnitude: loss.total,
            secondary_loss_magnitude: loss.secondary_magnitude,
            average_control_effectiveness: assessment.average_effectiveness,
            updated_resistance_strength: assessment.updated_resistance_strength,
            monte_carlo_results: MonteCarloSummary::from_point(residual_risk),
        }
    }

    /// Total loss magnitude at one bound, priced with the given assignments.
    pub fn calculate_loss_magnitude(
        &self,
        input: &RiskCalculationInput,
        bound: Bound,
        assignments: &[CostModuleAssignment],
    ) -> f64 {
        self.loss_pipeline().loss_at(input, bound, assignments)
    }
}

/// Baseline annualized loss with zero resistance strength:
/// `CF_avg * POA_avg * susceptibility(TC_avg, 0) * loss_avg`.
///
/// An unset threat capability contributes nothing rather than the sigmoid's
/// midpoint.
fn inherent_risk(input: &RiskCalculationInput, loss_avg: f64) -> f64 {
    let factors = &input.factors;
    let tc = factors.threat_capability.avg;
    if tc <= 0.0 {
        return 0.0;
    }

    sanitize(
        factors.contact_frequency.avg
            * factors.probability_of_action.avg
            * susceptibility(tc, 0.0)
            * loss_avg,
    )
}

/// Run the full pipeline with default configuration.
pub fn calculate_risk(input: &RiskCalculationInput) -> RiskCalculationResult {
    RiskEngine::default().calculate_risk(input)
}

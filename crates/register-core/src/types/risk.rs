//! Calculation input and output types.

use super::{Asset, Control, CostModuleAssignment, TriangularValue};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Risk severity rating, used to pick asset impact factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

impl Severity {
    /// Parse a severity tag case-insensitively; unknown tags are `Low`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => Self::parse(&s),
            _ => Self::default(),
        })
    }
}

/// The FAIR factor set elicited for one risk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FairFactors {
    pub contact_frequency: TriangularValue,
    pub probability_of_action: TriangularValue,
    pub threat_capability: TriangularValue,
    pub resistance_strength: TriangularValue,
    pub primary_loss_magnitude: TriangularValue,
    /// `None` when the risk carries no explicit secondary loss frequency.
    pub secondary_loss_event_frequency: Option<TriangularValue>,
    pub secondary_loss_magnitude: TriangularValue,
}

/// Everything one calculation needs, assembled per request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskCalculationInput {
    #[serde(flatten)]
    pub factors: FairFactors,
    pub severity: Severity,
    pub assets: Vec<Asset>,
    pub controls: Vec<Control>,
    pub cost_module_assignments: Vec<CostModuleAssignment>,
}

impl RiskCalculationInput {
    pub fn new(factors: FairFactors) -> Self {
        Self {
            factors,
            ..Default::default()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_cost_modules(mut self, assignments: Vec<CostModuleAssignment>) -> Self {
        self.cost_module_assignments = assignments;
        self
    }
}

/// Fixed multiplicative fan around a point risk value.
///
/// Named after the distribution summary the register displays; the values are
/// a heuristic envelope, not the output of random sampling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub mean: f64,
    pub p05: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
}

impl MonteCarloSummary {
    pub fn from_point(risk: f64) -> Self {
        Self {
            mean: risk,
            p05: risk * 0.3,
            p25: risk * 0.6,
            p50: risk,
            p75: risk * 1.4,
            p95: risk * 2.0,
            max: risk * 3.0,
        }
    }
}

/// Output of one calculation. Always replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCalculationResult {
    /// Expected annualized loss with no resistance and no controls.
    pub inherent_risk: f64,
    /// Expected annualized loss after control effectiveness.
    pub residual_risk: f64,
    /// Most-likely susceptibility (the avg point of the envelope).
    pub susceptibility: f64,
    pub susceptibility_envelope: TriangularValue,
    pub threat_event_frequency: TriangularValue,
    pub loss_event_frequency: TriangularValue,
    pub primary_loss: TriangularValue,
    pub loss_magnitude: TriangularValue,
    pub secondary_loss_magnitude: TriangularValue,
    pub average_control_effectiveness: f64,
    /// Resistance strength after applying control effectiveness, for display
    /// and persistence. Present only when at least one valid control exists.
    pub updated_resistance_strength: Option<TriangularValue>,
    pub monte_carlo_results: MonteCarloSummary,
}

impl RiskCalculationResult {
    pub fn zero() -> Self {
        Self::default()
    }

    /// A result carrying only previously stored risk values.
    pub fn from_prior(prior: PriorRisk) -> Self {
        Self {
            inherent_risk: prior.inherent_risk,
            residual_risk: prior.residual_risk,
            monte_carlo_results: MonteCarloSummary::from_point(prior.residual_risk),
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.inherent_risk == 0.0 && self.residual_risk == 0.0
    }
}

/// Risk values persisted by an earlier calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorRisk {
    pub inherent_risk: f64,
    pub residual_risk: f64,
}

impl PriorRisk {
    /// Whether any non-zero value was stored.
    pub fn exists(&self) -> bool {
        self.inherent_risk > 0.0 || self.residual_risk > 0.0
    }
}

//! Susceptibility (vulnerability): the probability that a threat event
//! becomes a loss event, modelled as a logistic curve of the gap between
//! threat capability and resistance strength.

use register_core::numeric::sanitize;
use register_core::types::TriangularValue;

/// Logistic steepness divisor: `1 / (1 + e^(-(tc - rs) / SCALE))`.
const SCALE: f64 = 2.0;

/// Raw sigmoid susceptibility in `[0, 1]`.
pub fn susceptibility(threat_capability: f64, resistance_strength: f64) -> f64 {
    let gap = sanitize(threat_capability) - sanitize(resistance_strength);
    let value = 1.0 / (1.0 + (-gap / SCALE).exp());
    value.clamp(0.0, 1.0)
}

/// Susceptibility for one envelope point. An unset factor (`<= 0` on either
/// side) yields 0 rather than a half-open sigmoid.
pub fn guarded_susceptibility(threat_capability: f64, resistance_strength: f64) -> f64 {
    if threat_capability <= 0.0 || resistance_strength <= 0.0 {
        return 0.0;
    }
    susceptibility(threat_capability, resistance_strength)
}

/// Conservative envelope: the low point pairs the weakest threat with the
/// strongest resistance, the high point the strongest threat with the
/// weakest resistance.
pub fn susceptibility_envelope(
    threat_capability: &TriangularValue,
    resistance_strength: &TriangularValue,
) -> TriangularValue {
    TriangularValue::new(
        guarded_susceptibility(threat_capability.min, resistance_strength.max),
        guarded_susceptibility(threat_capability.avg, resistance_strength.avg),
        guarded_susceptibility(threat_capability.max, resistance_strength.min),
    )
    .with_confidence(threat_capability.confidence)
}

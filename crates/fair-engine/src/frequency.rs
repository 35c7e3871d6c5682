//! Threat and loss event frequency composition.

use register_core::types::{FairFactors, TriangularValue};

/// Frequencies derived for one risk.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrequencyProfile {
    pub threat_event_frequency: TriangularValue,
    pub loss_event_frequency: TriangularValue,
}

/// `TEF = contact frequency * probability of action`, pointwise.
pub fn threat_event_frequency(
    contact_frequency: &TriangularValue,
    probability_of_action: &TriangularValue,
) -> TriangularValue {
    contact_frequency.times(probability_of_action)
}

/// `LEF = TEF * susceptibility`, pointwise.
pub fn loss_event_frequency(
    threat_event_frequency: &TriangularValue,
    susceptibility: &TriangularValue,
) -> TriangularValue {
    threat_event_frequency.times(susceptibility)
}

impl FrequencyProfile {
    pub fn compute(factors: &FairFactors, susceptibility: &TriangularValue) -> Self {
        let tef =
            threat_event_frequency(&factors.contact_frequency, &factors.probability_of_action);
        let lef = loss_event_frequency(&tef, susceptibility);
        Self {
            threat_event_frequency: tef,
            loss_event_frequency: lef,
        }
    }
}

//! Control effectiveness aggregation and residual risk reduction.

use register_core::config::EngineConfig;
use register_core::types::{Control, TriangularValue};
use tracing::{debug, warn};

/// Rated effectiveness is on a 0-10 scale.
pub const MAX_EFFECTIVENESS: f64 = 10.0;

/// Resistance strength is on the same 0-10 scale.
pub const MAX_RESISTANCE: f64 = 10.0;

/// Aggregated view of a risk's controls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlAssessment {
    /// Mean implementation-adjusted effectiveness over valid controls.
    pub average_effectiveness: f64,
    /// Controls that contributed to the average.
    pub valid_controls: usize,
    /// Resistance strength raised by the average effectiveness. Display and
    /// persistence only; risk is not recomputed from it.
    pub updated_resistance_strength: Option<TriangularValue>,
}

impl ControlAssessment {
    pub fn has_controls(&self) -> bool {
        self.valid_controls > 0
    }
}

/// Effectiveness after implementation status, or `None` when the record
/// cannot contribute.
fn adjusted_effectiveness(index: usize, control: &Control) -> Option<f64> {
    let Some(raw) = control.effectiveness else {
        warn!(index, control_id = ?control.id, "Control has no effectiveness, skipping");
        return None;
    };
    let Some(status) = control.implementation_status else {
        warn!(index, control_id = ?control.id, "Control has no implementation status, skipping");
        return None;
    };
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }

    let effectiveness = if raw > MAX_EFFECTIVENESS {
        warn!(
            index,
            control_id = ?control.id,
            effectiveness = raw,
            "Control effectiveness above scale, clamping"
        );
        MAX_EFFECTIVENESS
    } else {
        raw
    };

    Some(effectiveness * status.factor())
}

/// Average implementation-adjusted effectiveness over controls with a
/// positive rating. Returns `(average, contributing_count)`.
pub fn average_effectiveness(controls: &[Control]) -> (f64, usize) {
    let adjusted: Vec<f64> = controls
        .iter()
        .enumerate()
        .filter_map(|(i, c)| adjusted_effectiveness(i, c))
        .collect();

    if adjusted.is_empty() {
        return (0.0, 0);
    }
    let avg = adjusted.iter().sum::<f64>() / adjusted.len() as f64;
    (avg, adjusted.len())
}

/// `RS' = min(10, RS_avg + effectiveness)`, fanned out by the configured
/// multipliers.
pub fn updated_resistance_strength(
    resistance_strength: &TriangularValue,
    average_effectiveness: f64,
    config: &EngineConfig,
) -> TriangularValue {
    let base = (resistance_strength.avg + average_effectiveness).min(MAX_RESISTANCE);
    let m = config.resistance_multipliers;
    TriangularValue::new(
        (base * m.min).min(MAX_RESISTANCE),
        (base * m.avg).min(MAX_RESISTANCE),
        (base * m.max).min(MAX_RESISTANCE),
    )
    .with_confidence(resistance_strength.confidence)
}

/// Aggregate a risk's controls.
pub fn assess_controls(
    controls: &[Control],
    resistance_strength: &TriangularValue,
    config: &EngineConfig,
) -> ControlAssessment {
    let (average, count) = average_effectiveness(controls);
    if count == 0 {
        if !controls.is_empty() {
            debug!(
                total = controls.len(),
                "No control contributed effectiveness"
            );
        }
        return ControlAssessment::default();
    }

    ControlAssessment {
        average_effectiveness: average,
        valid_controls: count,
        updated_resistance_strength: Some(updated_resistance_strength(
            resistance_strength,
            average,
            config,
        )),
    }
}

/// Fraction of inherent risk removed: `min(effectiveness / 10 * cap, 1)`.
pub fn risk_reduction(average_effectiveness: f64, max_reduction: f64) -> f64 {
    (average_effectiveness / MAX_EFFECTIVENESS * max_reduction).clamp(0.0, 1.0)
}

/// Residual risk after controls. Without valid controls this is the
/// inherent risk unchanged.
pub fn residual_risk(
    inherent_risk: f64,
    assessment: &ControlAssessment,
    config: &EngineConfig,
) -> f64 {
    if !assessment.has_controls() {
        return inherent_risk;
    }
    let reduction = risk_reduction(
        assessment.average_effectiveness,
        config.max_control_reduction,
    );
    inherent_risk * (1.0 - reduction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use register_core::types::ImplementationStatus;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_single_full_control() {
        let controls = vec![Control::new(8.0, ImplementationStatus::FullyImplemented)];
        let (avg, count) = average_effectiveness(&controls);
        assert_eq!(avg, 8.0);
        assert_eq!(count, 1);

        let config = EngineConfig::default();
        let assessment = assess_controls(&controls, &TriangularValue::new(2.0, 5.0, 8.0), &config);
        assert!((residual_risk(1000.0, &assessment, &config) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_weighting_and_zero_filter() {
        let controls = vec![
            Control::new(8.0, ImplementationStatus::FullyImplemented),
            Control::new(6.0, ImplementationStatus::InProgress),
            Control::new(9.0, ImplementationStatus::Planned),
            Control::new(0.0, ImplementationStatus::FullyImplemented),
        ];
        // (8 + 3 + 0) / 3; the zero-rated control does not count
        let (avg, count) = average_effectiveness(&controls);
        assert_eq!(count, 3);
        assert!((avg - 11.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_malformed_controls_skipped() {
        let mut no_status = Control::new(5.0, ImplementationStatus::FullyImplemented);
        no_status.implementation_status = None;
        let mut no_rating = Control::new(5.0, ImplementationStatus::FullyImplemented);
        no_rating.effectiveness = None;

        let controls = vec![
            no_status,
            no_rating,
            Control::new(4.0, ImplementationStatus::FullyImplemented),
        ];
        assert_eq!(average_effectiveness(&controls), (4.0, 1));
    }

    #[test]
    fn test_no_valid_controls_keeps_inherent() {
        let config = EngineConfig::default();
        let assessment = assess_controls(&[], &TriangularValue::zero(), &config);
        assert!(!assessment.has_controls());
        assert_eq!(assessment.updated_resistance_strength, None);
        assert_eq!(residual_risk(1234.5, &assessment, &config), 1234.5);
    }

    #[test]
    fn test_reduction_is_capped() {
        assert!((risk_reduction(10.0, 0.5) - 0.5).abs() < EPS);
        assert!((risk_reduction(4.0, 0.5) - 0.2).abs() < EPS);
        assert_eq!(risk_reduction(10.0, 1.0), 1.0);

        let controls = vec![Control::new(25.0, ImplementationStatus::FullyImplemented)];
        let (avg, _) = average_effectiveness(&controls);
        assert_eq!(avg, MAX_EFFECTIVENESS);
    }

    #[test]
    fn test_updated_resistance_strength() {
        let config = EngineConfig::default();
        let rs = TriangularValue::new(2.0, 5.0, 8.0);

        let updated = updated_resistance_strength(&rs, 3.0, &config);
        assert!((updated.min - 6.4).abs() < EPS);
        assert!((updated.avg - 8.0).abs() < EPS);
        assert!((updated.max - 9.6).abs() < EPS);

        let capped = updated_resistance_strength(&rs, 8.0, &config);
        assert_eq!(capped.avg, 10.0);
        assert_eq!(capped.max, 10.0);
        assert!((capped.min - 8.0).abs() < EPS);
    }
}

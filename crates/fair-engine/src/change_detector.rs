//! Detects whether a risk's FAIR inputs changed enough to require a
//! recalculation.

use register_core::numeric::as_number;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Fields whose change invalidates a stored calculation.
pub const TRACKED_FIELDS: [&str; 25] = [
    "contactFrequencyMin",
    "contactFrequencyAvg",
    "contactFrequencyMax",
    "contactFrequencyConfidence",
    "probabilityOfActionMin",
    "probabilityOfActionAvg",
    "probabilityOfActionMax",
    "probabilityOfActionConfidence",
    "threatCapabilityMin",
    "threatCapabilityAvg",
    "threatCapabilityMax",
    "threatCapabilityConfidence",
    "resistanceStrengthMin",
    "resistanceStrengthAvg",
    "resistanceStrengthMax",
    "resistanceStrengthConfidence",
    "primaryLossMagnitudeMin",
    "primaryLossMagnitudeAvg",
    "primaryLossMagnitudeMax",
    "primaryLossMagnitudeConfidence",
    "secondaryLossMagnitudeMin",
    "secondaryLossMagnitudeAvg",
    "secondaryLossMagnitudeMax",
    "secondaryLossMagnitudeConfidence",
    "associatedAssets",
];

pub const DEFAULT_EPSILON: f64 = 1e-4;

#[derive(Debug, thiserror::Error)]
enum DetectError {
    #[error("{0} snapshot is not a JSON object")]
    NotAnObject(&'static str),
}

/// Compares two record snapshots over [`TRACKED_FIELDS`].
#[derive(Debug, Clone, Copy)]
pub struct ParameterChangeDetector {
    epsilon: f64,
}

impl Default for ParameterChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl ParameterChangeDetector {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Whether any tracked field differs.
    ///
    /// Fails safe: if the snapshots cannot be compared, reports a change so
    /// the caller recalculates instead of serving a stale value.
    pub fn has_changed(&self, original: &Value, current: &Value) -> bool {
        match self.compare(original, current) {
            Ok(Some(field)) => {
                debug!(field, "Tracked risk parameter changed");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Change detection failed, assuming changed");
                true
            }
        }
    }

    fn compare(
        &self,
        original: &Value,
        current: &Value,
    ) -> Result<Option<&'static str>, DetectError> {
        let original = as_object(original, "original")?;
        let current = as_object(current, "current")?;

        Ok(TRACKED_FIELDS
            .iter()
            .copied()
            .find(|field| self.field_differs(original.get(*field), current.get(*field))))
    }

    fn field_differs(&self, a: Option<&Value>, b: Option<&Value>) -> bool {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());

        match (a, b) {
            (None, None) => false,
            (Some(_), None) | (None, Some(_)) => true,
            (Some(Value::Array(x)), Some(Value::Array(y))) => {
                x.len() != y.len() || x.iter().zip(y).any(|(l, r)| l != r)
            }
            (Some(x), Some(y)) => match (as_number(x), as_number(y)) {
                (Some(l), Some(r)) => (l - r).abs() > self.epsilon,
                _ => match (x, y) {
                    (Value::String(l), Value::String(r)) => l != r,
                    (Value::Bool(l), Value::Bool(r)) => l != r,
                    _ => true,
                },
            },
        }
    }
}

fn as_object<'a>(
    value: &'a Value,
    which: &'static str,
) -> Result<&'a Map<String, Value>, DetectError> {
    value.as_object().ok_or(DetectError::NotAnObject(which))
}

/// Compare two snapshots with the default tolerance.
pub fn detect_parameter_change(original: &Value, current: &Value) -> bool {
    ParameterChangeDetector::default().has_changed(original, current)
}

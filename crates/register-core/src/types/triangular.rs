//! Triangular estimates for elicited FAIR factors.

use crate::numeric::{lenient, sanitize};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which point of a triangular estimate to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Avg,
    Max,
}

impl Bound {
    pub const ALL: [Bound; 3] = [Bound::Min, Bound::Avg, Bound::Max];
}

/// Analyst confidence in an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    /// Parse a confidence tag; anything unrecognised is `Medium`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
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

/// An elicited belief about a FAIR factor: minimum, most likely, maximum.
///
/// `min <= avg <= max` is expected but not enforced; nothing downstream
/// reorders the points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangularValue {
    #[serde(default, deserialize_with = "lenient")]
    pub min: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub avg: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub max: f64,
    #[serde(default)]
    pub confidence: Confidence,
}

impl TriangularValue {
    /// Create an estimate with medium confidence.
    pub fn new(min: f64, avg: f64, max: f64) -> Self {
        Self {
            min: sanitize(min),
            avg: sanitize(avg),
            max: sanitize(max),
            confidence: Confidence::Medium,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Same value at every bound.
    pub fn constant(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn get(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Min => self.min,
            Bound::Avg => self.avg,
            Bound::Max => self.max,
        }
    }

    /// Build an estimate by evaluating `f` at each bound.
    pub fn from_bounds(mut f: impl FnMut(Bound) -> f64) -> Self {
        Self::new(f(Bound::Min), f(Bound::Avg), f(Bound::Max))
    }

    /// Pointwise combination with another estimate. Keeps `self`'s confidence.
    pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self::new(
            f(self.min, other.min),
            f(self.avg, other.avg),
            f(self.max, other.max),
        )
        .with_confidence(self.confidence)
    }

    /// Pointwise product.
    pub fn times(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a * b)
    }

    /// Pointwise sum.
    pub fn plus(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0.0 && self.avg == 0.0 && self.max == 0.0
    }

    /// Whether `min <= avg <= max` holds.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.avg && self.avg <= self.max
    }
}

//! Configuration for the risk quantification engine.

use crate::types::Bound;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// A plain min/avg/max triple used for configured envelopes and multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl Envelope {
    pub const fn new(min: f64, avg: f64, max: f64) -> Self {
        Self { min, avg, max }
    }

    pub fn get(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Min => self.min,
            Bound::Avg => self.avg,
            Bound::Max => self.max,
        }
    }

    fn is_valid(&self) -> bool {
        [self.min, self.avg, self.max]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hours of disruption assumed per loss event for `perHour` cost modules.
    pub hours_per_event: f64,
    /// Secondary loss event frequency used with cost modules when the risk
    /// carries no explicit SLEF.
    pub default_secondary_frequency: Envelope,
    /// Tolerance for numeric comparisons in change detection.
    pub change_epsilon: f64,
    /// Largest fraction of inherent risk that controls can remove.
    pub max_control_reduction: f64,
    /// Scaling applied to the adjusted resistance strength at each bound.
    pub resistance_multipliers: Envelope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hours_per_event: 8.0,
            default_secondary_frequency: Envelope::new(0.1, 0.3, 0.7),
            change_epsilon: 1e-4,
            max_control_reduction: 0.5,
            resistance_multipliers: Envelope::new(0.8, 1.0, 1.2),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let var = |name: &str, fallback: f64| -> f64 {
            env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };

        let config = Self {
            hours_per_event: var("FAIR_HOURS_PER_EVENT", defaults.hours_per_event),
            default_secondary_frequency: Envelope {
                min: var("FAIR_SLEF_MIN", defaults.default_secondary_frequency.min),
                avg: var("FAIR_SLEF_AVG", defaults.default_secondary_frequency.avg),
                max: var("FAIR_SLEF_MAX", defaults.default_secondary_frequency.max),
            },
            change_epsilon: var("FAIR_CHANGE_EPSILON", defaults.change_epsilon),
            max_control_reduction: var(
                "FAIR_MAX_CONTROL_REDUCTION",
                defaults.max_control_reduction,
            ),
            resistance_multipliers: defaults.resistance_multipliers,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML/JSON/YAML file, with `FAIR_`-prefixed
    /// environment overrides. Nested keys are separated by `__`, e.g.
    /// `FAIR_DEFAULT_SECONDARY_FREQUENCY__MAX`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FAIR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite settings.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("hours_per_event", self.hours_per_event),
            ("change_epsilon", self.change_epsilon),
            ("max_control_reduction", self.max_control_reduction),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config {
                    message: format!("{} must be a non-negative number, got {}", name, value),
                });
            }
        }

        if self.max_control_reduction > 1.0 {
            return Err(Error::Config {
                message: format!(
                    "max_control_reduction must not exceed 1.0, got {}",
                    self.max_control_reduction
                ),
            });
        }

        if !self.default_secondary_frequency.is_valid() {
            return Err(Error::Config {
                message: "default_secondary_frequency values must be non-negative".to_string(),
            });
        }
        if !self.resistance_multipliers.is_valid() {
            return Err(Error::Config {
                message: "resistance_multipliers values must be non-negative".to_string(),
            });
        }

        Ok(())
    }
}

//! FAIR Engine
//!
//! Deterministic FAIR-style quantification of inherent and residual risk:
//! sigmoid susceptibility, frequency composition, primary and secondary loss
//! magnitude, control effectiveness, and the cache policy that decides when a
//! stored result must be recomputed.

pub mod cache_policy;
pub mod change_detector;
pub mod composer;
pub mod controls;
pub mod frequency;
pub mod loss_magnitude;
pub mod service;
pub mod sources;
pub mod susceptibility;

pub use cache_policy::{CacheDecision, CachePolicy};
pub use change_detector::{detect_parameter_change, ParameterChangeDetector, TRACKED_FIELDS};
pub use composer::{calculate_risk, RiskEngine};
pub use controls::{assess_controls, ControlAssessment};
pub use frequency::FrequencyProfile;
pub use loss_magnitude::{
    calculate_loss_magnitude, calculate_secondary_loss, per_event_cost, LossBreakdown,
    LossMagnitudePipeline, PrimaryLossEstimator, SeverityImpactEstimator,
};
pub use service::{RiskOutcome, RiskRecalculator};
pub use sources::{AssetLookup, ControlLookup, CostModuleLookup, InMemorySources};
pub use susceptibility::{susceptibility, susceptibility_envelope};

//! The persisted risk row, as the register stores it.

use super::{Confidence, FairFactors, PriorRisk, Severity, TriangularValue};
use crate::ingest::{string_list, text, timestamp_opt, uuid_or_nil};
use crate::numeric::{lenient, lenient_opt};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Flat risk record with one column per FAIR factor bound.
///
/// Numeric columns may arrive as numbers or decimal strings; both are parsed
/// once on deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskRecord {
    #[serde(deserialize_with = "uuid_or_nil")]
    pub id: Uuid,
    #[serde(deserialize_with = "text")]
    pub title: String,
    pub severity: Severity,
    /// Identifiers of the assets this risk is associated with.
    #[serde(deserialize_with = "string_list")]
    pub associated_assets: Vec<String>,

    #[serde(deserialize_with = "lenient")]
    pub contact_frequency_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub contact_frequency_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub contact_frequency_max: f64,
    pub contact_frequency_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub probability_of_action_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub probability_of_action_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub probability_of_action_max: f64,
    pub probability_of_action_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub threat_capability_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub threat_capability_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub threat_capability_max: f64,
    pub threat_capability_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub resistance_strength_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub resistance_strength_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub resistance_strength_max: f64,
    pub resistance_strength_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub primary_loss_magnitude_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub primary_loss_magnitude_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub primary_loss_magnitude_max: f64,
    pub primary_loss_magnitude_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_event_frequency_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_event_frequency_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_event_frequency_max: f64,
    pub secondary_loss_event_frequency_confidence: Confidence,

    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_magnitude_min: f64,
    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_magnitude_avg: f64,
    #[serde(deserialize_with = "lenient")]
    pub secondary_loss_magnitude_max: f64,
    pub secondary_loss_magnitude_confidence: Confidence,

    /// Previously stored results, if any.
    #[serde(deserialize_with = "lenient_opt")]
    pub inherent_risk: Option<f64>,
    #[serde(deserialize_with = "lenient_opt")]
    pub residual_risk: Option<f64>,

    #[serde(deserialize_with = "timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RiskRecord {
    /// Parse a record from a raw JSON row.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The record as a JSON object, for change detection.
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn has_assets(&self) -> bool {
        !self.associated_assets.is_empty()
    }

    /// Stored risk values, treating missing columns as zero.
    pub fn prior_risk(&self) -> PriorRisk {
        PriorRisk {
            inherent_risk: self.inherent_risk.unwrap_or(0.0),
            residual_risk: self.residual_risk.unwrap_or(0.0),
        }
    }

    /// The typed factor set. An all-zero secondary loss frequency is treated
    /// as not supplied.
    pub fn factors(&self) -> FairFactors {
        let slef = TriangularValue::new(
            self.secondary_loss_event_frequency_min,
            self.secondary_loss_event_frequency_avg,
            self.secondary_loss_event_frequency_max,
        )
        .with_confidence(self.secondary_loss_event_frequency_confidence);

        FairFactors {
            contact_frequency: TriangularValue::new(
                self.contact_frequency_min,
                self.contact_frequency_avg,
                self.contact_frequency_max,
            )
            .with_confidence(self.contact_frequency_confidence),
            probability_of_action: TriangularValue::new(
                self.probability_of_action_min,
                self.probability_of_action_avg,
                self.probability_of_action_max,
            )
            .with_confidence(self.probability_of_action_confidence),
            threat_capability: TriangularValue::new(
                self.threat_capability_min,
                self.threat_capability_avg,
                self.threat_capability_max,
            )
            .with_confidence(self.threat_capability_confidence),
            resistance_strength: TriangularValue::new(
                self.resistance_strength_min,
                self.resistance_strength_avg,
                self.resistance_strength_max,
            )
            .with_confidence(self.resistance_strength_confidence),
            primary_loss_magnitude: TriangularValue::new(
                self.primary_loss_magnitude_min,
                self.primary_loss_magnitude_avg,
                self.primary_loss_magnitude_max,
            )
            .with_confidence(self.primary_loss_magnitude_confidence),
            secondary_loss_event_frequency: (!slef.is_zero()).then_some(slef),
            secondary_loss_magnitude: TriangularValue::new(
                self.secondary_loss_magnitude_min,
                self.secondary_loss_magnitude_avg,
                self.secondary_loss_magnitude_max,
            )
            .with_confidence(self.secondary_loss_magnitude_confidence),
        }
    }

    /// Copy a factor set into the flat columns.
    pub fn set_factors(&mut self, factors: &FairFactors) {
        let cf = &factors.contact_frequency;
        self.contact_frequency_min = cf.min;
        self.contact_frequency_avg = cf.avg;
        self.contact_frequency_max = cf.max;
        self.contact_frequency_confidence = cf.confidence;

        let poa = &factors.probability_of_action;
        self.probability_of_action_min = poa.min;
        self.probability_of_action_avg = poa.avg;
        self.probability_of_action_max = poa.max;
        self.probability_of_action_confidence = poa.confidence;

        let tc = &factors.threat_capability;
        self.threat_capability_min = tc.min;
        self.threat_capability_avg = tc.avg;
        self.threat_capability_max = tc.max;
        self.threat_capability_confidence = tc.confidence;

        let rs = &factors.resistance_strength;
        self.resistance_strength_min = rs.min;
        self.resistance_strength_avg = rs.avg;
        self.resistance_strength_max = rs.max;
        self.resistance_strength_confidence = rs.confidence;

        let pl = &factors.primary_loss_magnitude;
        self.primary_loss_magnitude_min = pl.min;
        self.primary_loss_magnitude_avg = pl.avg;
        self.primary_loss_magnitude_max = pl.max;
        self.primary_loss_magnitude_confidence = pl.confidence;

        let slef = factors.secondary_loss_event_frequency.unwrap_or_default();
        self.secondary_loss_event_frequency_min = slef.min;
        self.secondary_loss_event_frequency_avg = slef.avg;
        self.secondary_loss_event_frequency_max = slef.max;
        self.secondary_loss_event_frequency_confidence = slef.confidence;

        let slm = &factors.secondary_loss_magnitude;
        self.secondary_loss_magnitude_min = slm.min;
        self.secondary_loss_magnitude_avg = slm.avg;
        self.secondary_loss_magnitude_max = slm.max;
        self.secondary_loss_magnitude_confidence = slm.confidence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_parses_string_columns() {
        let record = RiskRecord::from_json(json!({
            "title": "Ransomware on file servers",
            "severity": "critical",
            "associatedAssets": ["AST-1", "AST-2"],
            "contactFrequencyMin": "1",
            "contactFrequencyAvg": "5.0",
            "contactFrequencyMax": 10,
            "contactFrequencyConfidence": "high",
            "inherentRisk": "50000.00",
            "residualRisk": null
        }))
        .unwrap();

        assert_eq!(record.severity, Severity::Critical);
        assert!(record.has_assets());
        let factors = record.factors();
        assert_eq!(factors.contact_frequency.min, 1.0);
        assert_eq!(factors.contact_frequency.avg, 5.0);
        assert_eq!(factors.contact_frequency.max, 10.0);
        assert_eq!(factors.contact_frequency.confidence, Confidence::High);
        assert_eq!(record.prior_risk().inherent_risk, 50000.0);
        assert_eq!(record.prior_risk().residual_risk, 0.0);
    }

    #[test]
    fn test_zero_slef_is_not_supplied() {
        let record = RiskRecord::default();
        assert_eq!(record.factors().secondary_loss_event_frequency, None);
    }

    #[test]
    fn test_set_factors_round_trips_through_columns() {
        let factors = FairFactors {
            contact_frequency: TriangularValue::new(1.0, 5.0, 10.0),
            threat_capability: TriangularValue::new(2.0, 5.0, 8.0)
                .with_confidence(Confidence::Low),
            secondary_loss_event_frequency: Some(TriangularValue::new(0.1, 0.3, 0.5)),
            ..Default::default()
        };

        let mut record = RiskRecord::default();
        record.set_factors(&factors);

        assert_eq!(record.factors(), factors);
        assert_eq!(record.threat_capability_confidence, Confidence::Low);
    }

    #[test]
    fn test_snapshot_uses_camel_case_columns() {
        let record = RiskRecord {
            contact_frequency_avg: 5.0,
            ..Default::default()
        };
        let snapshot = record.snapshot();
        assert_eq!(snapshot["contactFrequencyAvg"], json!(5.0));
        assert!(snapshot.get("associatedAssets").is_some());
    }

    #[test]
    fn test_null_assets_and_bad_id_do_not_reject_record() {
        let record = RiskRecord::from_json(json!({
            "id": 42,
            "title": null,
            "associatedAssets": null,
            "updatedAt": "last tuesday",
            "contactFrequencyAvg": "5"
        }))
        .unwrap();

        assert!(record.id.is_nil());
        assert!(record.title.is_empty());
        assert!(!record.has_assets());
        assert_eq!(record.updated_at, None);
        assert_eq!(record.contact_frequency_avg, 5.0);
    }
}

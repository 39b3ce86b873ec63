use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub recommended_medications: Vec<RecommendedMedication>,
    /// Medication name → dose string.
    #[serde(default)]
    pub dosage: BTreeMap<String, String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub ai_recommendations: Vec<AiRecommendation>,
    pub justification: Option<String>,
    #[serde(default)]
    pub alternative_options: Vec<AlternativeOption>,
    #[serde(default)]
    pub warnings: Vec<PrescriptionWarning>,
    pub monitoring_plan: Option<MonitoringPlan>,
    pub patient_feedback: Option<String>,
    pub doctor_notes: Option<String>,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Prescription {
    /// Name of the first recommended medication, empty when there is none.
    pub fn primary_medication(&self) -> &str {
        self.recommended_medications
            .first()
            .map(|m| m.name.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMedication {
    pub id: i64,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
    pub evidence_level: EvidenceLevel,
    pub justification: String,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
    pub evidence_level: EvidenceLevel,
    #[serde(default)]
    pub clinical_studies: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub drug_interactions: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub why_not_chosen: String,
    pub evidence_level: EvidenceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionWarning {
    #[serde(rename = "type")]
    pub kind: WarningType,
    pub severity: WarningSeverity,
    pub message: String,
    pub medication: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringPlan {
    #[serde(default)]
    pub parameters: Vec<MonitoringParameter>,
    #[serde(default)]
    pub follow_up_schedule: Vec<FollowUp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringParameter {
    pub name: String,
    pub frequency: String,
    pub normal_range: String,
    pub critical_values: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub timeframe: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

fn default_status() -> PrescriptionStatus {
    PrescriptionStatus::Draft
}

/// Payload for a new prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionCreate {
    pub patient_id: i64,
    #[serde(default)]
    pub recommended_medications: Vec<RecommendedMedication>,
    #[serde(default)]
    pub dosage: BTreeMap<String, String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub ai_recommendations: Vec<AiRecommendation>,
    pub justification: Option<String>,
    #[serde(default)]
    pub warnings: Vec<PrescriptionWarning>,
    #[serde(default = "default_status")]
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub is_ai_generated: bool,
}

/// Partial prescription edit. `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionUpdate {
    pub recommended_medications: Option<Vec<RecommendedMedication>>,
    pub dosage: Option<BTreeMap<String, String>>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    pub ai_recommendations: Option<Vec<AiRecommendation>>,
    pub justification: Option<String>,
    pub alternative_options: Option<Vec<AlternativeOption>>,
    pub warnings: Option<Vec<PrescriptionWarning>>,
    pub monitoring_plan: Option<MonitoringPlan>,
    pub patient_feedback: Option<String>,
    pub doctor_notes: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

impl PrescriptionUpdate {
    /// Merge the provided fields over `prescription`. Status legality is
    /// checked by the caller before merging.
    pub fn apply_to(self, prescription: &mut Prescription) {
        if let Some(medications) = self.recommended_medications {
            prescription.recommended_medications = medications;
        }
        if let Some(dosage) = self.dosage {
            prescription.dosage = dosage;
        }
        if let Some(recommendations) = self.ai_recommendations {
            prescription.ai_recommendations = recommendations;
        }
        if let Some(alternatives) = self.alternative_options {
            prescription.alternative_options = alternatives;
        }
        if let Some(warnings) = self.warnings {
            prescription.warnings = warnings;
        }
        if let Some(status) = self.status {
            prescription.status = status;
        }

        prescription.duration = self.duration.or(prescription.duration.take());
        prescription.instructions = self.instructions.or(prescription.instructions.take());
        prescription.justification = self.justification.or(prescription.justification.take());
        prescription.monitoring_plan = self.monitoring_plan.or(prescription.monitoring_plan.take());
        prescription.patient_feedback =
            self.patient_feedback.or(prescription.patient_feedback.take());
        prescription.doctor_notes = self.doctor_notes.or(prescription.doctor_notes.take());
    }
}

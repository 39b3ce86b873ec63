use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::*;
use super::lab::LabResults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub doctor_id: i64,
    pub full_name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub lab_results: LabResults,
    #[serde(default)]
    pub current_medications: Vec<CurrentMedication>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub previous_anticoagulants: Vec<PreviousAnticoagulant>,
    pub lifestyle_factors: Option<LifestyleFactors>,
    pub risk_factors: Option<RiskFactors>,
    pub social_factors: Option<SocialFactors>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn has_allergies(&self) -> bool {
        !self.allergies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub allergen: String,
    pub reaction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousAnticoagulant {
    pub medication: String,
    pub dosage: String,
    pub reason_for_discontinuation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleFactors {
    pub smoking: Smoking,
    pub alcohol: Alcohol,
    pub physical_activity: PhysicalActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Smoking {
    pub status: SmokingStatus,
    pub pack_years: Option<f64>,
    pub quit_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alcohol {
    pub status: AlcoholStatus,
    pub units_per_week: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalActivity {
    pub level: ActivityLevel,
    pub hours_per_week: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub previous_bleeding: PreviousBleeding,
    pub falls: Falls,
    pub surgeries: Surgeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousBleeding {
    pub has_bleeding: bool,
    #[serde(default)]
    pub episodes: Vec<BleedingEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BleedingEpisode {
    pub date: String,
    pub severity: BleedingSeverity,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Falls {
    pub has_falls: bool,
    pub frequency: Option<FallFrequency>,
    pub last_fall: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surgeries {
    pub recent_surgery: bool,
    #[serde(default)]
    pub surgeries: Vec<Surgery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surgery {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub complications: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialFactors {
    pub compliance: Compliance,
    pub support: Support,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    pub level: ComplianceLevel,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub family_support: bool,
    pub caregiver: bool,
    pub social_services: bool,
}

/// Payload for a new patient. Identity, owner and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientCreate {
    pub full_name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub lab_results: LabResults,
    #[serde(default)]
    pub current_medications: Vec<CurrentMedication>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub previous_anticoagulants: Vec<PreviousAnticoagulant>,
}

/// Partial patient edit. `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientUpdate {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub diagnosis: Option<String>,
    pub comorbidities: Option<Vec<String>>,
    pub lab_results: Option<LabResults>,
    pub current_medications: Option<Vec<CurrentMedication>>,
    pub allergies: Option<Vec<Allergy>>,
    pub previous_anticoagulants: Option<Vec<PreviousAnticoagulant>>,
    pub lifestyle_factors: Option<LifestyleFactors>,
    pub risk_factors: Option<RiskFactors>,
    pub social_factors: Option<SocialFactors>,
}

impl PatientUpdate {
    /// Merge the provided fields over `patient`.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(full_name) = self.full_name {
            patient.full_name = full_name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(gender) = self.gender {
            patient.gender = gender;
        }
        if let Some(comorbidities) = self.comorbidities {
            patient.comorbidities = comorbidities;
        }
        if let Some(lab_results) = self.lab_results {
            patient.lab_results = lab_results;
        }
        if let Some(medications) = self.current_medications {
            patient.current_medications = medications;
        }
        if let Some(allergies) = self.allergies {
            patient.allergies = allergies;
        }
        if let Some(anticoagulants) = self.previous_anticoagulants {
            patient.previous_anticoagulants = anticoagulants;
        }

        patient.weight = self.weight.or(patient.weight);
        patient.height = self.height.or(patient.height);
        patient.phone = self.phone.or(patient.phone.take());
        patient.email = self.email.or(patient.email.take());
        patient.diagnosis = self.diagnosis.or(patient.diagnosis.take());
        patient.lifestyle_factors = self.lifestyle_factors.or(patient.lifestyle_factors.take());
        patient.risk_factors = self.risk_factors.or(patient.risk_factors.take());
        patient.social_factors = self.social_factors.or(patient.social_factors.take());
    }
}

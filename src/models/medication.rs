use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugInteraction {
    pub medication: String,
    pub severity: String,
    pub description: String,
    pub management: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringParameter {
    pub parameter: String,
    pub frequency: String,
    pub normal_range: String,
    pub critical_values: String,
}

/// Dose bounds in the units of `available_dosages`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TherapeuticRange {
    pub min: f64,
    pub max: f64,
}

/// Reference entry of the drug catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub generic_name: Option<String>,
    pub drug_class: Option<String>,
    pub mechanism_of_action: Option<String>,
    #[serde(default)]
    pub available_dosages: Vec<String>,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub drug_interactions: Vec<DrugInteraction>,
    #[serde(default)]
    pub monitoring_parameters: Vec<MonitoringParameter>,
    pub therapeutic_range: Option<TherapeuticRange>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short form returned by catalog search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSearchResult {
    pub id: i64,
    pub name: String,
    pub generic_name: Option<String>,
    pub drug_class: Option<String>,
    #[serde(default)]
    pub available_dosages: Vec<String>,
}

impl From<&Medication> for MedicationSearchResult {
    fn from(med: &Medication) -> Self {
        Self {
            id: med.id,
            name: med.name.clone(),
            generic_name: med.generic_name.clone(),
            drug_class: med.drug_class.clone(),
            available_dosages: med.available_dosages.clone(),
        }
    }
}

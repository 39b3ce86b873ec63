use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;

/// Column a prescription list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionSortKey {
    #[default]
    Date,
    Medication,
    Patient,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionFilter {
    /// Case-insensitive substring over medication names, instructions and patient name.
    pub search: Option<String>,
    pub status: Option<PrescriptionStatus>,
    pub patient_id: Option<i64>,
    pub sort_by: PrescriptionSortKey,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientFilter {
    /// Case-insensitive substring over name and diagnosis.
    pub search: Option<String>,
    pub doctor_id: Option<i64>,
}

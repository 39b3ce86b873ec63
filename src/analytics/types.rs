use serde::{Deserialize, Serialize};

/// Patients per age band. Bounds are inclusive; ages under 18 are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroups {
    #[serde(rename = "18-30")]
    pub young: usize,
    #[serde(rename = "31-50")]
    pub adult: usize,
    #[serde(rename = "51-70")]
    pub middle_aged: usize,
    #[serde(rename = "71+")]
    pub senior: usize,
}

impl AgeGroups {
    pub fn record(&mut self, age: u32) {
        match age {
            18..=30 => self.young += 1,
            31..=50 => self.adult += 1,
            51..=70 => self.middle_aged += 1,
            71.. => self.senior += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderStats {
    pub male: usize,
    pub female: usize,
    pub other: usize,
}

/// One row of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub draft: usize,
}

/// Dashboard summary over one patient set and one prescription set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub age_groups: AgeGroups,
    pub gender_stats: GenderStats,
    pub top_diagnoses: Vec<RankedCount>,
    pub top_comorbidities: Vec<RankedCount>,
    pub prescription_stats: PrescriptionStats,
    pub top_medications: Vec<RankedCount>,
    pub top_allergies: Vec<RankedCount>,
    /// Mean age rounded to the nearest year, 0 without patients.
    pub average_age: u32,
    /// Share of patients with at least one allergy, as a rounded percentage.
    pub allergy_percentage: u32,
    pub total_patients: usize,
}

impl AnalyticsSummary {
    /// Count for `label` in a ranking, if it made the cut.
    pub fn rank_count(ranking: &[RankedCount], label: &str) -> Option<usize> {
        ranking.iter().find(|r| r.label == label).map(|r| r.count)
    }
}

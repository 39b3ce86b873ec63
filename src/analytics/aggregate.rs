use std::collections::BTreeMap;

use super::types::*;
use crate::models::{Gender, Patient, Prescription, PrescriptionStatus};

/// Length of every top-N ranking.
pub const TOP_N: usize = 5;

/// Computes the dashboard summary. Pure: equal inputs give equal output.
pub fn compute_analytics(patients: &[Patient], prescriptions: &[Prescription]) -> AnalyticsSummary {
    let mut age_groups = AgeGroups::default();
    let mut gender_stats = GenderStats::default();
    for patient in patients {
        age_groups.record(patient.age);
        match patient.gender {
            Gender::Male => gender_stats.male += 1,
            Gender::Female => gender_stats.female += 1,
            Gender::Other => gender_stats.other += 1,
        }
    }

    let top_diagnoses = top_n(
        patients
            .iter()
            .filter_map(|p| p.diagnosis.as_deref())
            .filter(|d| !d.is_empty()),
    );
    let top_comorbidities = top_n(
        patients
            .iter()
            .flat_map(|p| p.comorbidities.iter().map(String::as_str)),
    );
    let top_medications = top_n(
        prescriptions
            .iter()
            .flat_map(|rx| rx.recommended_medications.iter().map(|m| m.name.as_str())),
    );
    let top_allergies = top_n(
        patients
            .iter()
            .flat_map(|p| p.allergies.iter().map(|a| a.allergen.as_str())),
    );

    let with_allergies = patients.iter().filter(|p| p.has_allergies()).count();
    let total_age: u64 = patients.iter().map(|p| u64::from(p.age)).sum();

    AnalyticsSummary {
        age_groups,
        gender_stats,
        top_diagnoses,
        top_comorbidities,
        prescription_stats: prescription_stats(prescriptions),
        top_medications,
        top_allergies,
        average_age: rounded_ratio(total_age as f64, patients.len()),
        allergy_percentage: rounded_ratio(with_allergies as f64 * 100.0, patients.len()),
        total_patients: patients.len(),
    }
}

fn prescription_stats(prescriptions: &[Prescription]) -> PrescriptionStats {
    let mut stats = PrescriptionStats {
        total: prescriptions.len(),
        ..Default::default()
    };
    for rx in prescriptions {
        match rx.status {
            PrescriptionStatus::Active => stats.active += 1,
            PrescriptionStatus::Completed => stats.completed += 1,
            PrescriptionStatus::Cancelled => stats.cancelled += 1,
            PrescriptionStatus::Draft => stats.draft += 1,
        }
    }
    stats
}

/// `numerator / count` rounded half away from zero; 0 when `count` is 0.
fn rounded_ratio(numerator: f64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (numerator / count as f64).round() as u32
}

/// Counts labels, then keeps the `TOP_N` most frequent.
///
/// Ties are ordered alphabetically: counting goes through a `BTreeMap` and
/// the count sort is stable.
pub fn top_n<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<RankedCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(TOP_N)
        .map(|(label, count)| RankedCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

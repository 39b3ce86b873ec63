//! Search, filter and sort for the patient and prescription list screens.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    Patient, PatientFilter, Prescription, PrescriptionFilter, PrescriptionSortKey, SortOrder,
};

fn normalized_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// Applies `filter` to `prescriptions`, returning matches in the requested
/// order. `patients` resolves names for searching and sorting; a prescription
/// whose patient is missing sorts with an empty name.
pub fn filter_prescriptions(
    prescriptions: &[Prescription],
    patients: &[Patient],
    filter: &PrescriptionFilter,
) -> Vec<Prescription> {
    let names: HashMap<i64, &str> = patients
        .iter()
        .map(|p| (p.id, p.full_name.as_str()))
        .collect();
    let patient_name = |rx: &Prescription| names.get(&rx.patient_id).copied().unwrap_or("");
    let term = normalized_term(filter.search.as_deref());

    let mut matches: Vec<Prescription> = prescriptions
        .iter()
        .filter(|rx| filter.status.map_or(true, |status| rx.status == status))
        .filter(|rx| filter.patient_id.map_or(true, |id| rx.patient_id == id))
        .filter(|rx| match &term {
            None => true,
            Some(term) => {
                rx.recommended_medications
                    .iter()
                    .any(|m| contains_term(&m.name, term))
                    || rx
                        .instructions
                        .as_deref()
                        .is_some_and(|i| contains_term(i, term))
                    || contains_term(patient_name(rx), term)
            }
        })
        .cloned()
        .collect();

    let compare = |a: &Prescription, b: &Prescription| -> Ordering {
        match filter.sort_by {
            PrescriptionSortKey::Date => a.created_at.cmp(&b.created_at),
            PrescriptionSortKey::Medication => a.primary_medication().cmp(b.primary_medication()),
            PrescriptionSortKey::Patient => patient_name(a).cmp(patient_name(b)),
            PrescriptionSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    };
    match filter.order {
        SortOrder::Asc => matches.sort_by(compare),
        SortOrder::Desc => matches.sort_by(|a, b| compare(b, a)),
    }
    matches
}

/// Patients matching `filter`, in stored order.
pub fn filter_patients(patients: &[Patient], filter: &PatientFilter) -> Vec<Patient> {
    let term = normalized_term(filter.search.as_deref());
    patients
        .iter()
        .filter(|p| filter.doctor_id.map_or(true, |id| p.doctor_id == id))
        .filter(|p| match &term {
            None => true,
            Some(term) => {
                contains_term(&p.full_name, term)
                    || p.diagnosis.as_deref().is_some_and(|d| contains_term(d, term))
            }
        })
        .cloned()
        .collect()
}

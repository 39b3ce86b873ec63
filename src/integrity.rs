use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Patient, Prescription};
use crate::store::{MockStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityCategory {
    /// Prescription references a patient that does not exist.
    OrphanPrescription,
    /// Prescription owner differs from its patient's owner.
    DoctorMismatch,
}

/// A single referential problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    pub category: IntegrityCategory,
    pub prescription_id: i64,
    pub patient_id: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
    pub prescriptions_checked: usize,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn orphan_ids(&self) -> Vec<i64> {
        self.issues
            .iter()
            .filter(|i| i.category == IntegrityCategory::OrphanPrescription)
            .map(|i| i.prescription_id)
            .collect()
    }
}

/// Checks every prescription against the patient collection.
///
/// Detects:
/// - prescriptions whose `patient_id` matches no patient
/// - prescriptions owned by a different doctor than their patient
pub fn check_integrity(patients: &[Patient], prescriptions: &[Prescription]) -> IntegrityReport {
    let owners: HashMap<i64, i64> = patients.iter().map(|p| (p.id, p.doctor_id)).collect();
    let mut issues = Vec::new();

    for rx in prescriptions {
        match owners.get(&rx.patient_id) {
            None => issues.push(IntegrityIssue {
                category: IntegrityCategory::OrphanPrescription,
                prescription_id: rx.id,
                patient_id: rx.patient_id,
                description: format!(
                    "Prescription {} references missing patient {}",
                    rx.id, rx.patient_id
                ),
            }),
            Some(&owner) if owner != rx.doctor_id => issues.push(IntegrityIssue {
                category: IntegrityCategory::DoctorMismatch,
                prescription_id: rx.id,
                patient_id: rx.patient_id,
                description: format!(
                    "Prescription {} belongs to doctor {} but patient {} to doctor {owner}",
                    rx.id, rx.doctor_id, rx.patient_id
                ),
            }),
            Some(_) => {}
        }
    }

    IntegrityReport {
        issues,
        prescriptions_checked: prescriptions.len(),
    }
}

/// Loads both collections from `store` and checks them.
pub async fn check_store_integrity(store: &MockStore) -> Result<IntegrityReport, StoreError> {
    let patients = store.patients().list().await?;
    let prescriptions = store.prescriptions().list().await?;
    let report = check_integrity(&patients, &prescriptions);
    if !report.is_clean() {
        tracing::warn!(issues = report.issues.len(), "Integrity check found problems");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SeedData;

    #[test]
    fn demo_data_is_consistent() {
        let seed = SeedData::demo();
        let report = check_integrity(&seed.patients, &seed.prescriptions);
        assert!(report.is_clean());
        assert_eq!(report.prescriptions_checked, 8);
    }

    #[test]
    fn reports_doctor_mismatch() {
        let mut seed = SeedData::demo();
        seed.prescriptions[3].doctor_id = 9;
        let report = check_integrity(&seed.patients, &seed.prescriptions);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, IntegrityCategory::DoctorMismatch);
        assert_eq!(report.issues[0].prescription_id, 4);
        assert!(report.orphan_ids().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_patient_orphans_prescriptions() {
        let store = MockStore::in_memory(SeedData::demo()).unwrap();
        assert!(store.patients().delete(1).await.unwrap());

        let report = check_store_integrity(&store).await.unwrap();
        assert_eq!(report.orphan_ids(), vec![1, 3]);
        assert!(report.issues.iter().all(|i| i.patient_id == 1));
    }
}

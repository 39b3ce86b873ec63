use std::sync::atomic::AtomicU64;

use chrono::{DateTime, Utc};

use super::{Record, RevisionCounters, SeedData, StoreError};
use crate::db::keys;
use crate::models::{
    Patient, PatientCreate, PatientUpdate, Prescription, PrescriptionCreate, PrescriptionStatus,
    PrescriptionUpdate,
};

const MAX_AGE: u32 = 150;

fn check_full_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::invalid("full_name", "must not be blank"));
    }
    Ok(())
}

fn check_age(age: u32) -> Result<(), StoreError> {
    if age > MAX_AGE {
        return Err(StoreError::invalid("age", format!("{age} exceeds {MAX_AGE}")));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: Option<f64>) -> Result<(), StoreError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(StoreError::invalid(field, format!("{v} is not a positive number")))
        }
        _ => Ok(()),
    }
}

impl Record for Patient {
    type Create = PatientCreate;
    type Update = PatientUpdate;

    const ENTITY: &'static str = "Patient";
    const KEY: &'static str = keys::PATIENTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn doctor_id(&self) -> i64 {
        self.doctor_id
    }

    fn build(
        id: i64,
        doctor_id: i64,
        now: DateTime<Utc>,
        data: PatientCreate,
    ) -> Result<Self, StoreError> {
        check_full_name(&data.full_name)?;
        check_age(data.age)?;
        check_positive("weight", data.weight)?;
        check_positive("height", data.height)?;

        Ok(Patient {
            id,
            doctor_id,
            full_name: data.full_name,
            age: data.age,
            gender: data.gender,
            weight: data.weight,
            height: data.height,
            phone: data.phone,
            email: data.email,
            diagnosis: data.diagnosis,
            comorbidities: data.comorbidities,
            lab_results: data.lab_results,
            current_medications: data.current_medications,
            allergies: data.allergies,
            previous_anticoagulants: data.previous_anticoagulants,
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: now,
            updated_at: Some(now),
        })
    }

    fn merge(&mut self, update: PatientUpdate, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(name) = &update.full_name {
            check_full_name(name)?;
        }
        if let Some(age) = update.age {
            check_age(age)?;
        }
        check_positive("weight", update.weight)?;
        check_positive("height", update.height)?;

        update.apply_to(self);
        self.updated_at = Some(now);
        Ok(())
    }

    fn seed_slice(seed: &SeedData) -> &[Self] {
        &seed.patients
    }

    fn revision(revisions: &RevisionCounters) -> &AtomicU64 {
        &revisions.patients
    }
}

impl Record for Prescription {
    type Create = PrescriptionCreate;
    type Update = PrescriptionUpdate;

    const ENTITY: &'static str = "Prescription";
    const KEY: &'static str = keys::PRESCRIPTIONS;

    fn id(&self) -> i64 {
        self.id
    }

    fn doctor_id(&self) -> i64 {
        self.doctor_id
    }

    fn build(
        id: i64,
        doctor_id: i64,
        now: DateTime<Utc>,
        data: PrescriptionCreate,
    ) -> Result<Self, StoreError> {
        if data.patient_id <= 0 {
            return Err(StoreError::invalid(
                "patient_id",
                format!("{} is not a valid patient id", data.patient_id),
            ));
        }
        match data.status {
            PrescriptionStatus::Draft => {}
            PrescriptionStatus::Active if data.recommended_medications.is_empty() => {
                return Err(StoreError::invalid(
                    "recommended_medications",
                    "an active prescription needs at least one medication",
                ));
            }
            PrescriptionStatus::Active => {}
            other => {
                return Err(StoreError::invalid(
                    "status",
                    format!("a new prescription cannot start as {other}"),
                ));
            }
        }

        Ok(Prescription {
            id,
            patient_id: data.patient_id,
            doctor_id,
            recommended_medications: data.recommended_medications,
            dosage: data.dosage,
            duration: data.duration,
            instructions: data.instructions,
            ai_recommendations: data.ai_recommendations,
            justification: data.justification,
            alternative_options: Vec::new(),
            warnings: data.warnings,
            monitoring_plan: None,
            patient_feedback: None,
            doctor_notes: None,
            status: data.status,
            is_ai_generated: data.is_ai_generated,
            created_at: now,
            updated_at: Some(now),
        })
    }

    fn merge(&mut self, update: PrescriptionUpdate, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(next) = update.status {
            if !self.status.can_transition_to(next) {
                return Err(StoreError::invalid(
                    "status",
                    format!("cannot move from {} to {next}", self.status),
                ));
            }
        }

        update.apply_to(self);

        if self.status == PrescriptionStatus::Active && self.recommended_medications.is_empty() {
            return Err(StoreError::invalid(
                "recommended_medications",
                "an active prescription needs at least one medication",
            ));
        }
        self.updated_at = Some(now);
        Ok(())
    }

    fn seed_slice(seed: &SeedData) -> &[Self] {
        &seed.prescriptions
    }

    fn revision(revisions: &RevisionCounters) -> &AtomicU64 {
        &revisions.prescriptions
    }
}

//! Analytics Aggregator: dashboard statistics over patients and prescriptions.
//!
//! `compute_analytics` is a pure function of its two inputs. `AnalyticsCache`
//! sits in front of it for the router and recomputes only when a store
//! revision moves.

mod aggregate;
mod cache;
mod types;

pub use aggregate::*;
pub use cache::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allergy, Gender, Patient, PatientUpdate};
    use crate::store::{MockStore, SeedData};
    use chrono::Utc;

    fn patient(id: i64, age: u32, gender: Gender, diagnosis: Option<&str>) -> Patient {
        Patient {
            id,
            doctor_id: 1,
            full_name: format!("Пациент {id}"),
            age,
            gender,
            weight: None,
            height: None,
            phone: None,
            email: None,
            diagnosis: diagnosis.map(String::from),
            comorbidities: Vec::new(),
            lab_results: Default::default(),
            current_medications: Vec::new(),
            allergies: Vec::new(),
            previous_anticoagulants: Vec::new(),
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn labels(ranking: &[RankedCount]) -> Vec<(&str, usize)> {
        ranking.iter().map(|r| (r.label.as_str(), r.count)).collect()
    }

    #[test]
    fn demo_clinic_summary() {
        let seed = SeedData::demo();
        let summary = compute_analytics(&seed.patients, &seed.prescriptions);

        assert_eq!(summary.total_patients, 8);
        assert_eq!(summary.average_age, 59);
        assert_eq!(summary.allergy_percentage, 63);
        assert_eq!(
            summary.age_groups,
            AgeGroups {
                young: 0,
                adult: 2,
                middle_aged: 4,
                senior: 2,
            }
        );
        assert_eq!(
            summary.gender_stats,
            GenderStats {
                male: 4,
                female: 4,
                other: 0,
            }
        );
        assert_eq!(
            summary.prescription_stats,
            PrescriptionStats {
                total: 8,
                active: 6,
                completed: 1,
                cancelled: 0,
                draft: 1,
            }
        );
    }

    #[test]
    fn rankings_break_ties_alphabetically() {
        let seed = SeedData::demo();
        let summary = compute_analytics(&seed.patients, &seed.prescriptions);

        assert_eq!(
            labels(&summary.top_diagnoses),
            vec![
                ("Фибрилляция предсердий", 3),
                ("Ишемическая болезнь сердца", 2),
                ("Тромбоз глубоких вен", 2),
                ("Тромбоэмболия легочной артерии", 1),
            ]
        );
        assert_eq!(
            labels(&summary.top_medications),
            vec![
                ("Апиксабан", 2),
                ("Варфарин", 2),
                ("Ривароксабан", 2),
                ("Дабигатран", 1),
                ("Метформин", 1),
            ]
        );
        assert_eq!(
            labels(&summary.top_comorbidities),
            vec![
                ("Гипертония", 5),
                ("Варикозная болезнь", 2),
                ("Ожирение", 2),
                ("Сахарный диабет 2 типа", 2),
                ("Атеросклероз", 1),
            ]
        );
        assert_eq!(
            labels(&summary.top_allergies),
            vec![("Пенициллин", 2), ("Аспирин", 1), ("Йод", 1), ("Сульфаниламиды", 1)]
        );
    }

    #[test]
    fn warfarin_counted_across_prescriptions() {
        let seed = SeedData::demo();
        let summary = compute_analytics(&seed.patients, &seed.prescriptions);
        assert_eq!(
            AnalyticsSummary::rank_count(&summary.top_medications, "Варфарин"),
            Some(2)
        );
    }

    #[test]
    fn three_seniors_fill_the_oldest_band() {
        let mut seed = SeedData::demo();
        seed.patients[7].age = 75;
        let summary = compute_analytics(&seed.patients, &seed.prescriptions);
        assert_eq!(summary.age_groups.senior, 3);
        assert_eq!(summary.total_patients, 8);
    }

    #[test]
    fn age_band_bounds_are_inclusive() {
        let patients: Vec<Patient> = [17, 18, 30, 31, 50, 51, 70, 71]
            .into_iter()
            .enumerate()
            .map(|(i, age)| patient(i as i64 + 1, age, Gender::Other, None))
            .collect();
        let summary = compute_analytics(&patients, &[]);
        assert_eq!(
            summary.age_groups,
            AgeGroups {
                young: 2,
                adult: 2,
                middle_aged: 2,
                senior: 1,
            }
        );
        assert_eq!(summary.gender_stats.other, 8);
    }

    #[test]
    fn patients_without_allergies_stay_in_denominator() {
        let mut allergic = patient(1, 40, Gender::Female, None);
        allergic.allergies.push(Allergy {
            allergen: "Йод".into(),
            reaction: "Кожная сыпь".into(),
        });
        let clear = patient(2, 60, Gender::Male, None);

        let summary = compute_analytics(&[allergic, clear], &[]);
        assert_eq!(summary.allergy_percentage, 50);
        assert_eq!(summary.average_age, 50);
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        let summary = compute_analytics(&[], &[]);
        assert_eq!(summary, AnalyticsSummary::default());
    }

    #[test]
    fn blank_diagnoses_are_skipped_and_rankings_truncate() {
        let mut patients: Vec<Patient> = (1..=7)
            .map(|i| patient(i, 40, Gender::Male, Some(format!("Диагноз {i}").as_str())))
            .collect();
        patients.push(patient(8, 40, Gender::Male, Some("")));
        patients.push(patient(9, 40, Gender::Male, None));

        let summary = compute_analytics(&patients, &[]);
        assert_eq!(summary.top_diagnoses.len(), TOP_N);
        assert!(summary.top_diagnoses.iter().all(|r| !r.label.is_empty()));
        assert_eq!(summary.top_diagnoses[0].label, "Диагноз 1");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let seed = SeedData::demo();
        let first = compute_analytics(&seed.patients, &seed.prescriptions);
        let second = compute_analytics(&seed.patients, &seed.prescriptions);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_serializes_band_labels() {
        let seed = SeedData::demo();
        let json = serde_json::to_value(compute_analytics(&seed.patients, &seed.prescriptions))
            .unwrap();
        assert_eq!(json["age_groups"]["71+"], 2);
        assert_eq!(json["age_groups"]["18-30"], 0);
        assert_eq!(json["top_medications"][1]["label"], "Варфарин");
    }

    #[tokio::test]
    async fn cache_recomputes_only_after_writes() {
        let store = MockStore::in_memory(SeedData::demo()).unwrap();
        let cache = AnalyticsCache::new();

        let first = cache.summary(&store, None).await.unwrap();
        let again = cache.summary(&store, None).await.unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &again));

        store
            .patients()
            .update(
                8,
                PatientUpdate {
                    age: Some(80),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fresh = cache.summary(&store, None).await.unwrap();
        assert!(!std::sync::Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.age_groups.senior, 3);
    }

    #[tokio::test]
    async fn cache_scopes_by_doctor() {
        let store = MockStore::in_memory(SeedData::demo()).unwrap();
        let cache = AnalyticsCache::new();

        let other = cache.summary(&store, Some(2)).await.unwrap();
        assert_eq!(other.total_patients, 0);
        assert_eq!(other.prescription_stats.total, 0);

        let mine = cache.summary(&store, Some(1)).await.unwrap();
        assert_eq!(mine.total_patients, 8);
    }
}

//! Demo fixtures loaded into a fresh store: eight patients and eight
//! prescriptions, all owned by doctor 1.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{
    AiRecommendation, Allergy, CurrentMedication, EvidenceLevel, Gender, LabParameter, LabResults,
    LabValue, Patient, PreviousAnticoagulant, Prescription, PrescriptionStatus,
    RecommendedMedication,
};

const DEMO_DOCTOR_ID: i64 = 1;

/// Initial contents for both collections.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub patients: Vec<Patient>,
    pub prescriptions: Vec<Prescription>,
}

impl SeedData {
    pub fn new(patients: Vec<Patient>, prescriptions: Vec<Prescription>) -> Self {
        Self {
            patients,
            prescriptions,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The demo clinic.
    pub fn demo() -> Self {
        Self::new(demo_patients(), demo_prescriptions())
    }
}

fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn labs(values: &[(LabParameter, f64)]) -> LabResults {
    values
        .iter()
        .map(|(param, value)| (param.clone(), LabValue::Number(*value)))
        .collect()
}

fn current(name: &str, dosage: &str, frequency: &str, duration: &str) -> CurrentMedication {
    CurrentMedication {
        name: name.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
        duration: duration.into(),
    }
}

fn allergy(allergen: &str, reaction: &str) -> Allergy {
    Allergy {
        allergen: allergen.into(),
        reaction: reaction.into(),
    }
}

fn discontinued(medication: &str, dosage: &str, reason: &str) -> PreviousAnticoagulant {
    PreviousAnticoagulant {
        medication: medication.into(),
        dosage: dosage.into(),
        reason_for_discontinuation: reason.into(),
    }
}

fn demo_patients() -> Vec<Patient> {
    use LabParameter::*;

    vec![
        Patient {
            id: 1,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Иванов Иван Иванович".into(),
            age: 65,
            gender: Gender::Male,
            weight: Some(75.0),
            height: Some(175.0),
            phone: Some("+7 (999) 123-45-67".into()),
            email: Some("ivanov@example.com".into()),
            diagnosis: Some("Фибрилляция предсердий".into()),
            comorbidities: strings(&["Гипертония", "Сахарный диабет 2 типа"]),
            lab_results: labs(&[(Inr, 2.1), (Aptt, 35.2), (Creatinine, 95.5)]),
            current_medications: vec![
                current("Варфарин", "5мг", "1 раз в день", "6 месяцев"),
                current("Метформин", "500мг", "2 раза в день", "постоянно"),
            ],
            allergies: vec![allergy("Пенициллин", "Кожная сыпь")],
            previous_anticoagulants: vec![discontinued(
                "Варфарин",
                "5мг",
                "Переход на новую схему",
            )],
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 18, 10, 30),
            updated_at: Some(at(10, 19, 14, 20)),
        },
        Patient {
            id: 2,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Петрова Анна Сергеевна".into(),
            age: 58,
            gender: Gender::Female,
            weight: Some(68.0),
            height: Some(162.0),
            phone: Some("+7 (999) 234-56-78".into()),
            email: Some("petrova@example.com".into()),
            diagnosis: Some("Тромбоз глубоких вен".into()),
            comorbidities: strings(&["Варикозная болезнь"]),
            lab_results: labs(&[(Inr, 2.8), (DDimer, 850.0)]),
            current_medications: vec![current("Ривароксабан", "20мг", "1 раз в день", "3 месяца")],
            allergies: Vec::new(),
            previous_anticoagulants: Vec::new(),
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 18, 9, 15),
            updated_at: Some(at(10, 19, 11, 45)),
        },
        Patient {
            id: 3,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Сидоров Петр Николаевич".into(),
            age: 72,
            gender: Gender::Male,
            weight: Some(82.0),
            height: Some(180.0),
            phone: Some("+7 (999) 345-67-89".into()),
            email: Some("sidorov@example.com".into()),
            diagnosis: Some("Ишемическая болезнь сердца".into()),
            comorbidities: strings(&["Гипертония", "Атеросклероз"]),
            lab_results: labs(&[(Inr, 1.9), (Cholesterol, 6.2)]),
            current_medications: vec![
                current("Аспирин", "100мг", "1 раз в день", "постоянно"),
                current("Аторвастатин", "20мг", "1 раз в день", "постоянно"),
            ],
            allergies: vec![allergy("Аспирин", "Желудочное кровотечение")],
            previous_anticoagulants: vec![discontinued(
                "Клопидогрел",
                "75мг",
                "Замена на аспирин",
            )],
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 18, 16, 30),
            updated_at: Some(at(10, 19, 13, 15)),
        },
        Patient {
            id: 4,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Козлова Мария Александровна".into(),
            age: 45,
            gender: Gender::Female,
            weight: Some(62.0),
            height: Some(168.0),
            phone: Some("+7 (999) 456-78-90".into()),
            email: Some("kozlova@example.com".into()),
            diagnosis: Some("Фибрилляция предсердий".into()),
            comorbidities: strings(&["Гипертония", "Ожирение"]),
            lab_results: labs(&[(Inr, 2.3), (Aptt, 28.5)]),
            current_medications: vec![current("Апиксабан", "5мг", "2 раза в день", "постоянно")],
            allergies: vec![allergy("Сульфаниламиды", "Кожная сыпь")],
            previous_anticoagulants: Vec::new(),
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 17, 14, 20),
            updated_at: Some(at(10, 19, 9, 30)),
        },
        Patient {
            id: 5,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Морозов Владимир Сергеевич".into(),
            age: 78,
            gender: Gender::Male,
            weight: Some(70.0),
            height: Some(172.0),
            phone: Some("+7 (999) 567-89-01".into()),
            email: Some("morozov@example.com".into()),
            diagnosis: Some("Тромбоэмболия легочной артерии".into()),
            comorbidities: strings(&["ХОБЛ", "Хроническая сердечная недостаточность"]),
            lab_results: labs(&[(Inr, 2.5), (DDimer, 1200.0)]),
            current_medications: vec![current(
                "Ривароксабан",
                "15мг",
                "2 раза в день",
                "3 недели",
            )],
            allergies: Vec::new(),
            previous_anticoagulants: vec![discontinued("Варфарин", "3мг", "Нестабильное МНО")],
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 16, 11, 45),
            updated_at: Some(at(10, 19, 16, 20)),
        },
        Patient {
            id: 6,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Волкова Елена Петровна".into(),
            age: 52,
            gender: Gender::Female,
            weight: Some(58.0),
            height: Some(165.0),
            phone: Some("+7 (999) 678-90-12".into()),
            email: Some("volkova@example.com".into()),
            diagnosis: Some("Тромбоз глубоких вен".into()),
            comorbidities: strings(&["Варикозная болезнь", "Гипотиреоз"]),
            lab_results: labs(&[(Inr, 2.0), (DDimer, 650.0)]),
            current_medications: vec![current(
                "Апиксабан",
                "2.5мг",
                "2 раза в день",
                "6 месяцев",
            )],
            allergies: vec![allergy("Йод", "Кожная сыпь")],
            previous_anticoagulants: Vec::new(),
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 15, 8, 30),
            updated_at: Some(at(10, 19, 12, 15)),
        },
        Patient {
            id: 7,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Новиков Андрей Михайлович".into(),
            age: 35,
            gender: Gender::Male,
            weight: Some(85.0),
            height: Some(185.0),
            phone: Some("+7 (999) 789-01-23".into()),
            email: Some("novikov@example.com".into()),
            diagnosis: Some("Фибрилляция предсердий".into()),
            comorbidities: strings(&["Гипертония"]),
            lab_results: labs(&[(Inr, 2.2), (Aptt, 32.1)]),
            current_medications: vec![current(
                "Дабигатран",
                "150мг",
                "2 раза в день",
                "постоянно",
            )],
            allergies: Vec::new(),
            previous_anticoagulants: Vec::new(),
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 14, 16, 45),
            updated_at: Some(at(10, 19, 10, 30)),
        },
        Patient {
            id: 8,
            doctor_id: DEMO_DOCTOR_ID,
            full_name: "Соколова Татьяна Владимировна".into(),
            age: 68,
            gender: Gender::Female,
            weight: Some(72.0),
            height: Some(160.0),
            phone: Some("+7 (999) 890-12-34".into()),
            email: Some("sokolova@example.com".into()),
            diagnosis: Some("Ишемическая болезнь сердца".into()),
            comorbidities: strings(&["Сахарный диабет 2 типа", "Гипертония", "Ожирение"]),
            lab_results: labs(&[(Inr, 1.8), (Cholesterol, 7.8)]),
            current_medications: vec![
                current("Варфарин", "3мг", "1 раз в день", "постоянно"),
                current("Метформин", "1000мг", "2 раза в день", "постоянно"),
            ],
            allergies: vec![allergy("Пенициллин", "Анафилаксия")],
            previous_anticoagulants: vec![discontinued(
                "Клопидогрел",
                "75мг",
                "Побочные эффекты",
            )],
            lifestyle_factors: None,
            risk_factors: None,
            social_factors: None,
            created_at: at(10, 13, 13, 20),
            updated_at: Some(at(10, 19, 14, 45)),
        },
    ]
}

/// Single-medication prescription; dosage map, duration and instructions
/// mirror the medication.
fn single(
    id: i64,
    patient_id: i64,
    medication: RecommendedMedication,
    status: PrescriptionStatus,
    is_ai_generated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Prescription {
    let dosage = BTreeMap::from([(medication.name.clone(), medication.dosage.clone())]);
    Prescription {
        id,
        patient_id,
        doctor_id: DEMO_DOCTOR_ID,
        dosage,
        duration: Some(medication.duration.clone()),
        instructions: Some(medication.instructions.clone()),
        recommended_medications: vec![medication],
        ai_recommendations: Vec::new(),
        justification: None,
        alternative_options: Vec::new(),
        warnings: Vec::new(),
        monitoring_plan: None,
        patient_feedback: None,
        doctor_notes: None,
        status,
        is_ai_generated,
        created_at,
        updated_at: Some(updated_at),
    }
}

fn demo_prescriptions() -> Vec<Prescription> {
    use PrescriptionStatus::*;

    let mut warfarin = single(
        1,
        1,
        RecommendedMedication {
            id: 1,
            name: "Варфарин".into(),
            dosage: "5мг".into(),
            frequency: "1 раз в день".into(),
            duration: "6 месяцев".into(),
            instructions: "Принимать в одно и то же время, контролировать МНО еженедельно".into(),
            evidence_level: EvidenceLevel::A,
            justification: "Рекомендуется для профилактики тромбоэмболии при фибрилляции предсердий"
                .into(),
            contraindications: strings(&["Беременность", "Активное кровотечение"]),
            side_effects: strings(&["Кровотечения", "Кожные реакции"]),
        },
        Active,
        true,
        at(10, 18, 10, 30),
        at(10, 19, 14, 20),
    );
    warfarin.ai_recommendations = vec![AiRecommendation {
        medication: "Варфарин".into(),
        dosage: "5мг".into(),
        frequency: "1 раз в день".into(),
        duration: "6 месяцев".into(),
        instructions: "Принимать в одно и то же время".into(),
        evidence_level: EvidenceLevel::A,
        clinical_studies: strings(&["WARFARIN vs NOAC study"]),
        contraindications: strings(&["Беременность"]),
        drug_interactions: strings(&["Аспирин", "НПВС"]),
        side_effects: strings(&["Кровотечения"]),
    }];
    warfarin.justification =
        Some("Пациент с фибрилляцией предсердий, высокий риск тромбоэмболии".into());

    vec![
        warfarin,
        single(
            2,
            2,
            RecommendedMedication {
                id: 2,
                name: "Ривароксабан".into(),
                dosage: "20мг".into(),
                frequency: "1 раз в день".into(),
                duration: "3 месяца".into(),
                instructions: "Принимать во время еды".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Эффективен при тромбозе глубоких вен".into(),
                contraindications: strings(&["Активное кровотечение"]),
                side_effects: strings(&["Кровотечения", "Тошнота"]),
            },
            Active,
            false,
            at(10, 18, 9, 15),
            at(10, 19, 11, 45),
        ),
        single(
            3,
            1,
            RecommendedMedication {
                id: 3,
                name: "Метформин".into(),
                dosage: "500мг".into(),
                frequency: "2 раза в день".into(),
                duration: "постоянно".into(),
                instructions: "Принимать во время еды".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Базовая терапия сахарного диабета 2 типа".into(),
                contraindications: strings(&["Почечная недостаточность"]),
                side_effects: strings(&["Тошнота", "Диарея"]),
            },
            Active,
            false,
            at(10, 18, 8, 0),
            at(10, 19, 8, 0),
        ),
        single(
            4,
            4,
            RecommendedMedication {
                id: 4,
                name: "Апиксабан".into(),
                dosage: "5мг".into(),
                frequency: "2 раза в день".into(),
                duration: "постоянно".into(),
                instructions: "Принимать в одно и то же время".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Стандартная доза для пациентов с ФП".into(),
                contraindications: strings(&["Активное кровотечение"]),
                side_effects: strings(&["Кровотечения"]),
            },
            Active,
            true,
            at(10, 17, 14, 20),
            at(10, 19, 9, 30),
        ),
        single(
            5,
            5,
            RecommendedMedication {
                id: 5,
                name: "Ривароксабан".into(),
                dosage: "15мг".into(),
                frequency: "2 раза в день".into(),
                duration: "3 недели".into(),
                instructions: "Принимать во время еды".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Лечение ТЭЛА с переходом дозировки".into(),
                contraindications: strings(&["Активное кровотечение"]),
                side_effects: strings(&["Кровотечения", "Тошнота"]),
            },
            Active,
            false,
            at(10, 16, 11, 45),
            at(10, 19, 16, 20),
        ),
        single(
            6,
            6,
            RecommendedMedication {
                id: 6,
                name: "Апиксабан".into(),
                dosage: "2.5мг".into(),
                frequency: "2 раза в день".into(),
                duration: "6 месяцев".into(),
                instructions: "Принимать в одно и то же время".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Сниженная доза для пациентов с факторами риска".into(),
                contraindications: strings(&["Активное кровотечение"]),
                side_effects: strings(&["Кровотечения"]),
            },
            Active,
            true,
            at(10, 15, 8, 30),
            at(10, 19, 12, 15),
        ),
        single(
            7,
            7,
            RecommendedMedication {
                id: 7,
                name: "Дабигатран".into(),
                dosage: "150мг".into(),
                frequency: "2 раза в день".into(),
                duration: "постоянно".into(),
                instructions: "Принимать во время еды".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Стандартная доза для молодых пациентов с ФП".into(),
                contraindications: strings(&["Активное кровотечение"]),
                side_effects: strings(&["Диспепсия", "Кровотечения"]),
            },
            Completed,
            false,
            at(10, 14, 16, 45),
            at(10, 19, 10, 30),
        ),
        single(
            8,
            8,
            RecommendedMedication {
                id: 8,
                name: "Варфарин".into(),
                dosage: "3мг".into(),
                frequency: "1 раз в день".into(),
                duration: "постоянно".into(),
                instructions: "Принимать в одно и то же время, контролировать МНО".into(),
                evidence_level: EvidenceLevel::A,
                justification: "Сниженная доза для пациентов с множественными факторами риска"
                    .into(),
                contraindications: strings(&["Активное кровотечение", "Беременность"]),
                side_effects: strings(&["Кровотечения", "Кожные реакции"]),
            },
            Draft,
            true,
            at(10, 13, 13, 20),
            at(10, 19, 14, 45),
        ),
    ]
}

//! Read-only drug reference behind the `/medications` routes.
//!
//! Entries are fixed at construction. Listing and class queries only see
//! active entries; lookup by id sees everything.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::medication::MonitoringParameter;
use crate::models::{DrugInteraction, Medication, MedicationSearchResult, TherapeuticRange};
use crate::store::StoreError;

/// Upper bound on search results.
pub const MAX_SEARCH_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct MedicationCatalog {
    medications: Vec<Medication>,
}

impl MedicationCatalog {
    pub fn new(medications: Vec<Medication>) -> Self {
        Self { medications }
    }

    /// The demo formulary.
    pub fn demo() -> Self {
        Self::new(demo_medications())
    }

    /// Active entries, optionally restricted to one exact `drug_class`, paged.
    pub fn list(&self, drug_class: Option<&str>, skip: usize, limit: usize) -> Vec<Medication> {
        let drug_class = drug_class.filter(|c| !c.is_empty());
        self.medications
            .iter()
            .filter(|m| m.is_active)
            .filter(|m| drug_class.map_or(true, |class| m.drug_class.as_deref() == Some(class)))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match on the name, at most
    /// `MAX_SEARCH_LIMIT` results.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<MedicationSearchResult>, StoreError> {
        if limit > MAX_SEARCH_LIMIT {
            return Err(StoreError::invalid(
                "limit",
                format!("must be at most {MAX_SEARCH_LIMIT}"),
            ));
        }
        let term = query.to_lowercase();
        let results: Vec<MedicationSearchResult> = self
            .medications
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&term))
            .take(limit)
            .map(MedicationSearchResult::from)
            .collect();
        tracing::debug!(query, found = results.len(), "Medication search");
        Ok(results)
    }

    pub fn get(&self, id: i64) -> Result<&Medication, StoreError> {
        self.medications
            .iter()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Medication",
                id,
            })
    }

    /// Distinct non-empty classes of active entries, sorted.
    pub fn classes(&self) -> Vec<String> {
        self.medications
            .iter()
            .filter(|m| m.is_active)
            .filter_map(|m| m.drug_class.as_deref())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn interaction(medication: &str, severity: &str, description: &str, management: &str) -> DrugInteraction {
    DrugInteraction {
        medication: medication.into(),
        severity: severity.into(),
        description: description.into(),
        management: management.into(),
    }
}

fn monitoring(parameter: &str, frequency: &str, normal_range: &str, critical_values: &str) -> MonitoringParameter {
    MonitoringParameter {
        parameter: parameter.into(),
        frequency: frequency.into(),
        normal_range: normal_range.into(),
        critical_values: critical_values.into(),
    }
}

fn demo_medications() -> Vec<Medication> {
    vec![
        Medication {
            id: 1,
            name: "Аспирин".into(),
            generic_name: Some("Ацетилсалициловая кислота".into()),
            drug_class: Some("НПВС".into()),
            mechanism_of_action: Some("Ингибирует циклооксигеназу".into()),
            available_dosages: strings(&["100 мг", "500 мг"]),
            indications: strings(&["Боль", "Воспаление", "Лихорадка"]),
            contraindications: strings(&["Язвенная болезнь", "Гемофилия"]),
            side_effects: strings(&["Тошнота", "Изжога", "Кровотечения"]),
            drug_interactions: vec![
                interaction("Варфарин", "высокий", "Усиление антикоагулянтного эффекта", "Контроль МНО"),
                interaction("Метотрексат", "средний", "Усиление токсичности", "Снижение дозы"),
            ],
            monitoring_parameters: vec![
                monitoring("ЖКТ", "ежедневно", "отсутствие симптомов", "кровотечение"),
                monitoring("Кровотечения", "при появлении", "отсутствие", "массивное кровотечение"),
            ],
            therapeutic_range: Some(TherapeuticRange { min: 0.0, max: 100.0 }),
            is_active: true,
            created_at: at(1, 10),
            updated_at: Some(at(1, 10)),
        },
        Medication {
            id: 2,
            name: "Метформин".into(),
            generic_name: Some("Метформин гидрохлорид".into()),
            drug_class: Some("Бигуаниды".into()),
            mechanism_of_action: Some("Снижает продукцию глюкозы в печени".into()),
            available_dosages: strings(&["500 мг", "850 мг", "1000 мг"]),
            indications: strings(&["Сахарный диабет 2 типа"]),
            contraindications: strings(&["Почечная недостаточность", "Печеночная недостаточность"]),
            side_effects: strings(&["Тошнота", "Диарея", "Металлический привкус"]),
            drug_interactions: vec![
                interaction("Алкоголь", "высокий", "Риск лактоацидоза", "Избегать употребления"),
                interaction(
                    "Йодсодержащие контрасты",
                    "высокий",
                    "Риск острой почечной недостаточности",
                    "Отмена за 48 часов",
                ),
            ],
            monitoring_parameters: vec![
                monitoring("Креатинин", "ежемесячно", "60-120 мкмоль/л", ">150 мкмоль/л"),
                monitoring("Глюкоза", "ежедневно", "4-7 ммоль/л", "<3 или >15 ммоль/л"),
            ],
            therapeutic_range: Some(TherapeuticRange { min: 0.0, max: 2000.0 }),
            is_active: true,
            created_at: at(1, 12),
            updated_at: Some(at(1, 12)),
        },
        Medication {
            id: 3,
            name: "Амлодипин".into(),
            generic_name: Some("Амлодипин безилат".into()),
            drug_class: Some("Блокаторы кальциевых каналов".into()),
            mechanism_of_action: Some("Блокирует кальциевые каналы L-типа".into()),
            available_dosages: strings(&["2.5 мг", "5 мг", "10 мг"]),
            indications: strings(&["Гипертония", "Стенокардия"]),
            contraindications: strings(&["Шок", "Стеноз аорты"]),
            side_effects: strings(&["Отеки ног", "Головокружение", "Покраснение лица"]),
            drug_interactions: vec![
                interaction("Грейпфрут", "средний", "Усиление эффекта", "Избегать употребления"),
                interaction("Симвастатин", "высокий", "Риск миопатии", "Контроль КФК"),
            ],
            monitoring_parameters: vec![
                monitoring("АД", "ежедневно", "120/80 мм рт.ст.", ">180/110 мм рт.ст."),
                monitoring("ЧСС", "ежедневно", "60-100 уд/мин", "<50 или >120 уд/мин"),
            ],
            therapeutic_range: Some(TherapeuticRange { min: 0.0, max: 10.0 }),
            is_active: true,
            created_at: at(1, 14),
            updated_at: Some(at(1, 14)),
        },
    ]
}

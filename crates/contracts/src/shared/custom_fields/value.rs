use super::error::CustomFieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Значения полей одной сущности: `field_key -> value`
pub type FieldValues = BTreeMap<String, String>;

/// Значения полей нескольких сущностей: `entity_id -> FieldValues`
pub type EntityFieldValues = BTreeMap<String, FieldValues>;

/// Сохранённое значение. Идентичность - (entity_type, entity_id, field_key).
/// Значение всегда строка, независимо от логического типа поля.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub entity_type: String,
    pub entity_id: String,
    pub field_key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Запрос на запись одного значения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFieldValueRequest {
    pub entity_type: String,
    pub entity_id: String,
    pub field_key: String,
    pub value: String,
}

/// Результат записи одного ключа в пакетной операции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub field_key: String,
    pub saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpsertOutcome {
    pub fn saved(field_key: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            saved: true,
            error: None,
        }
    }

    pub fn failed(field_key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            saved: false,
            error: Some(error.into()),
        }
    }
}

/// Отчёт пакетной записи. Операция не атомарна: каждый ключ пишется
/// независимо, частичный успех - допустимый исход.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpsertReport {
    pub outcomes: Vec<UpsertOutcome>,
}

impl BatchUpsertReport {
    pub fn push(&mut self, outcome: UpsertOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.saved)
    }

    pub fn saved_keys(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.saved)
            .map(|o| o.field_key.clone())
            .collect()
    }

    pub fn failed_keys(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.saved)
            .map(|o| o.field_key.clone())
            .collect()
    }

    /// Ok при полном успехе, иначе `PartialSave` со списком ключей
    pub fn into_result(self) -> Result<(), CustomFieldError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(CustomFieldError::PartialSave {
                failed_keys: self.failed_keys(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_classifies_outcomes() {
        let mut report = BatchUpsertReport::default();
        assert!(report.is_complete());

        report.push(UpsertOutcome::saved("taxId"));
        report.push(UpsertOutcome::failed("riskTier", "db locked"));

        assert!(!report.is_complete());
        assert_eq!(report.saved_keys(), vec!["taxId"]);
        assert_eq!(report.failed_keys(), vec!["riskTier"]);
        assert_eq!(
            report.into_result(),
            Err(CustomFieldError::PartialSave {
                failed_keys: vec!["riskTier".into()]
            })
        );
    }

    #[test]
    fn test_saved_outcome_omits_error_on_wire() {
        let json = serde_json::to_value(UpsertOutcome::saved("k")).unwrap();
        assert_eq!(json, serde_json::json!({"fieldKey": "k", "saved": true}));
    }
}

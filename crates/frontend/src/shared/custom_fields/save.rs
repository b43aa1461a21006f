//! Вторая фаза сохранения сущности: запись значений пользовательских полей

use super::api;
use contracts::shared::custom_fields::{BatchUpsertReport, CustomFieldError, FieldValues};

/// Итог сохранения формы сущности
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Сущность сохранена; `warning` задан, если часть полей не записалась
    Saved { warning: Option<String> },
    /// Сущность удалена в другом месте (404 при обновлении)
    Missing(String),
}

/// Записать значения полей для только что сохранённой сущности.
///
/// `planned` - план из `DynamicFieldsSection`: по значению на активное
/// определение либо только изменённые поля, если сохранённые значения
/// не успели загрузиться. Пустой план ничего не отправляет.
pub async fn save_custom_fields(
    entity_type: &str,
    entity_id: &str,
    planned: &FieldValues,
) -> Result<BatchUpsertReport, CustomFieldError> {
    if planned.is_empty() {
        return Ok(BatchUpsertReport::default());
    }
    api::batch_upsert(entity_type, entity_id, planned).await
}

/// Текст предупреждения о частичном сохранении. `None` при полном успехе.
pub fn partial_save_warning(result: &Result<BatchUpsertReport, CustomFieldError>) -> Option<String> {
    match result {
        Ok(report) => report.clone().into_result().err().map(|e| e.to_string()),
        Err(e) => Some(format!("Saved, but custom fields were not persisted: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::custom_fields::UpsertOutcome;

    #[test]
    fn test_partial_save_warning() {
        let mut report = BatchUpsertReport::default();
        report.push(UpsertOutcome::saved("taxId"));
        assert_eq!(partial_save_warning(&Ok(report.clone())), None);

        report.push(UpsertOutcome::failed("riskTier", "disk full"));
        let warning = partial_save_warning(&Ok(report)).unwrap();
        assert!(warning.contains("riskTier"));
        assert!(!warning.contains("taxId"));

        let warning =
            partial_save_warning(&Err(CustomFieldError::Transient("HTTP 503".into()))).unwrap();
        assert!(warning.starts_with("Saved, but"));
    }
}

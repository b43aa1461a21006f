use serde::Deserialize;
use thiserror::Error;

/// Ошибки подсистемы пользовательских полей
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomFieldError {
    /// Локальная проверка до отправки запроса
    #[error("{0}")]
    Validation(String),

    /// HTTP 404: запись удалена или не существует
    #[error("Not found: {0}")]
    NotFound(String),

    /// Любая другая ошибка сети или сервера, без автоповтора
    #[error("Request failed: {0}")]
    Transient(String),

    /// Сущность сохранена, но часть значений полей не записана
    #[error(
        "Saved, but {} custom field(s) were not persisted: {}",
        .failed_keys.len(),
        .failed_keys.join(", ")
    )]
    PartialSave { failed_keys: Vec<String> },
}

/// Тело ошибки, которое возвращает сервер: `{"message": "..."}`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl CustomFieldError {
    /// Классифицировать не-2xx ответ по статусу и (необязательному) телу
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            400 | 422 => Self::Validation(message),
            404 => Self::NotFound(message),
            _ => Self::Transient(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_uses_message_body() {
        let err = CustomFieldError::from_status(404, r#"{"message":"bank gone"}"#);
        assert_eq!(err, CustomFieldError::NotFound("bank gone".into()));
        assert!(err.is_not_found());

        let err = CustomFieldError::from_status(400, r#"{"message":"Field name is required"}"#);
        assert_eq!(err, CustomFieldError::Validation("Field name is required".into()));
    }

    #[test]
    fn test_status_mapping_without_body() {
        let err = CustomFieldError::from_status(503, "");
        assert_eq!(err, CustomFieldError::Transient("HTTP 503".into()));
    }

    #[test]
    fn test_partial_save_message_lists_keys() {
        let err = CustomFieldError::PartialSave {
            failed_keys: vec!["taxId".into(), "riskTier".into()],
        };
        assert_eq!(
            err.to_string(),
            "Saved, but 2 custom field(s) were not persisted: taxId, riskTier"
        );
    }
}

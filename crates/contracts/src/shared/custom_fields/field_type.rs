//! Field type enumeration for custom fields

use super::error::CustomFieldError;
use serde::{Deserialize, Serialize};

/// Тип пользовательского поля.
///
/// Определяет, какой элемент управления рисуется в форме. На проводе
/// передаётся тегом в верхнем регистре ("TEXT", "NUMBER", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Boolean,
    Textarea,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Select,
        FieldType::Boolean,
        FieldType::Textarea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
            Self::Date => "DATE",
            Self::Select => "SELECT",
            Self::Boolean => "BOOLEAN",
            Self::Textarea => "TEXTAREA",
        }
    }

    /// Подпись для UI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Date => "Date",
            Self::Select => "Select",
            Self::Boolean => "Yes / No",
            Self::Textarea => "Multi-line text",
        }
    }

    /// Строгий разбор тега: неизвестный тип - ошибка валидации.
    /// Используется при создании и изменении определений.
    pub fn parse_strict(tag: &str) -> Result<Self, CustomFieldError> {
        let normalized = tag.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                CustomFieldError::Validation(format!("Unsupported field type: {}", tag.trim()))
            })
    }

    /// Мягкий разбор тега: неизвестный тип отображается как TEXT.
    pub fn parse_lenient(tag: &str) -> Self {
        Self::parse_strict(tag).unwrap_or(Self::Text)
    }

    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        Self::parse_lenient(&tag)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_accepts_known_tags_case_insensitively() {
        assert_eq!(FieldType::parse_strict("select").unwrap(), FieldType::Select);
        assert_eq!(FieldType::parse_strict(" TEXTAREA ").unwrap(), FieldType::Textarea);
    }

    #[test]
    fn test_strict_parse_rejects_unknown_tag() {
        let err = FieldType::parse_strict("COLOR").unwrap_err();
        assert!(matches!(err, CustomFieldError::Validation(_)));
    }

    #[test]
    fn test_unknown_tag_deserializes_as_text() {
        let t: FieldType = serde_json::from_str("\"RICH_HTML\"").unwrap();
        assert_eq!(t, FieldType::Text);
        let t: FieldType = serde_json::from_str("\"BOOLEAN\"").unwrap();
        assert_eq!(t, FieldType::Boolean);
    }

    #[test]
    fn test_serializes_as_upper_case_tag() {
        assert_eq!(serde_json::to_string(&FieldType::Date).unwrap(), "\"DATE\"");
    }
}

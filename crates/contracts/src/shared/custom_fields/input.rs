//! Контракт рендеринга одного пользовательского поля.
//!
//! Каждый тип поля - отдельный вариант со своими правилами разбора
//! сохранённой строки, сериализации и подсказок. Неизвестный тип
//! приходит сюда уже как TEXT (см. `FieldType::parse_lenient`).

use super::definition::FieldDefinition;
use super::field_type::FieldType;

pub const BOOL_TRUE: &str = "true";
pub const BOOL_FALSE: &str = "false";

/// Текущее состояние элемента управления поля
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    /// Число хранится строкой, разбор - на стороне потребителя
    Number(String),
    /// ISO-дата `YYYY-MM-DD`, без проверки диапазона
    Date(String),
    Select { options: Vec<String>, selected: String },
    Boolean(bool),
    Textarea(String),
}

/// Рекомендательная подсказка; сохранение не блокирует
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldHint {
    Required,
    UnknownOption(String),
}

impl FieldHint {
    pub fn message(&self) -> String {
        match self {
            Self::Required => "Required".to_string(),
            Self::UnknownOption(value) => format!("'{}' is not one of the options", value),
        }
    }
}

impl FieldInput {
    /// Построить элемент управления по определению и сохранённому значению
    pub fn from_definition(def: &FieldDefinition, stored: Option<&str>) -> Self {
        let raw = stored.unwrap_or("").to_string();
        match def.field_type {
            FieldType::Text => Self::Text(raw),
            FieldType::Number => Self::Number(raw),
            FieldType::Date => Self::Date(raw),
            FieldType::Select => Self::Select {
                options: def.options(),
                selected: raw,
            },
            FieldType::Boolean => Self::Boolean(raw.trim().eq_ignore_ascii_case(BOOL_TRUE)),
            FieldType::Textarea => Self::Textarea(raw),
        }
    }

    /// Строковое представление для хранения
    pub fn serialize(&self) -> String {
        match self {
            Self::Text(v) | Self::Number(v) | Self::Date(v) | Self::Textarea(v) => v.clone(),
            Self::Select { selected, .. } => selected.clone(),
            Self::Boolean(true) => BOOL_TRUE.to_string(),
            Self::Boolean(false) => BOOL_FALSE.to_string(),
        }
    }

    /// Применить ввод пользователя из элемента управления
    pub fn apply(&mut self, raw: &str) {
        match self {
            Self::Text(v) | Self::Number(v) | Self::Date(v) | Self::Textarea(v) => {
                *v = raw.to_string()
            }
            Self::Select { selected, .. } => *selected = raw.to_string(),
            Self::Boolean(checked) => *checked = raw.trim().eq_ignore_ascii_case(BOOL_TRUE),
        }
    }

    pub fn set_checked(&mut self, value: bool) {
        if let Self::Boolean(checked) = self {
            *checked = value;
        }
    }

    /// BOOLEAN никогда не бывает пустым: у него всегда есть значение
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(v) | Self::Number(v) | Self::Date(v) | Self::Textarea(v) => {
                v.trim().is_empty()
            }
            Self::Select { selected, .. } => selected.trim().is_empty(),
            Self::Boolean(_) => false,
        }
    }

    pub fn hint(&self, required: bool) -> Option<FieldHint> {
        if required && self.is_empty() {
            return Some(FieldHint::Required);
        }
        if let Self::Select { options, selected } = self {
            if !selected.is_empty() && !options.iter().any(|o| o == selected) {
                return Some(FieldHint::UnknownOption(selected.clone()));
            }
        }
        None
    }

    /// У BOOLEAN подпись встроена в сам чекбокс
    pub fn shows_label_row(&self) -> bool {
        !matches!(self, Self::Boolean(_))
    }

    /// Тип HTML-элемента `<input>` для однострочных полей
    pub fn html_input_type(&self) -> Option<&'static str> {
        match self {
            Self::Text(_) => Some("text"),
            Self::Number(_) => Some("number"),
            Self::Date(_) => Some("date"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::custom_fields::definition::FieldDefinitionDto;

    fn def(field_type: &str, options: Option<&str>) -> FieldDefinition {
        FieldDefinitionDto {
            entity_type: "bank".into(),
            field_name: "Sample".into(),
            field_type: field_type.into(),
            options_json: options.map(Into::into),
            ..Default::default()
        }
        .into_definition("1".into())
        .unwrap()
    }

    #[test]
    fn test_dispatch_per_type() {
        assert_eq!(
            FieldInput::from_definition(&def("TEXT", None), Some("abc")),
            FieldInput::Text("abc".into())
        );
        assert_eq!(
            FieldInput::from_definition(&def("NUMBER", None), Some("12.50")),
            FieldInput::Number("12.50".into())
        );
        assert_eq!(
            FieldInput::from_definition(&def("DATE", None), Some("2024-02-29")),
            FieldInput::Date("2024-02-29".into())
        );
        assert_eq!(
            FieldInput::from_definition(&def("TEXTAREA", None), None),
            FieldInput::Textarea(String::new())
        );
    }

    #[test]
    fn test_number_is_not_parsed() {
        let mut input = FieldInput::from_definition(&def("NUMBER", None), None);
        input.apply("1e3");
        assert_eq!(input.serialize(), "1e3");
    }

    #[test]
    fn test_select_with_malformed_options_has_no_choices() {
        let mut d = def("SELECT", Some(r#"["A"]"#));
        d.options_json = Some("[not json".into());
        match FieldInput::from_definition(&d, Some("A")) {
            FieldInput::Select { options, selected } => {
                assert!(options.is_empty());
                assert_eq!(selected, "A");
            }
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_select_keeps_chosen_option() {
        let d = def("SELECT", Some(r#"["Low","Medium","High"]"#));
        let mut input = FieldInput::from_definition(&d, None);
        input.apply("Medium");
        let stored = input.serialize();
        assert_eq!(stored, "Medium");

        let reloaded = FieldInput::from_definition(&d, Some(&stored));
        assert_eq!(
            reloaded,
            FieldInput::Select {
                options: vec!["Low".into(), "Medium".into(), "High".into()],
                selected: "Medium".into()
            }
        );
        assert_eq!(reloaded.hint(false), None);
    }

    #[test]
    fn test_boolean_serializes_to_literal_strings() {
        let d = def("BOOLEAN", None);
        let mut input = FieldInput::from_definition(&d, None);
        assert_eq!(input.serialize(), "false");
        input.set_checked(true);
        assert_eq!(input.serialize(), "true");
        input.set_checked(false);
        assert_eq!(input.serialize(), "false");

        assert_eq!(FieldInput::from_definition(&d, Some("TRUE")).serialize(), "true");
        assert_eq!(FieldInput::from_definition(&d, Some("yes")).serialize(), "false");
        assert!(!input.shows_label_row());
    }

    #[test]
    fn test_required_hint_is_advisory() {
        let d = def("TEXT", None);
        let input = FieldInput::from_definition(&d, Some("   "));
        assert_eq!(input.hint(true), Some(FieldHint::Required));
        assert_eq!(input.hint(false), None);
        assert_eq!(FieldHint::Required.message(), "Required");

        let boolean = FieldInput::from_definition(&def("BOOLEAN", None), None);
        assert_eq!(boolean.hint(true), None);
    }

    #[test]
    fn test_unknown_option_is_flagged_but_kept() {
        let d = def("SELECT", Some(r#"["Low"]"#));
        let input = FieldInput::from_definition(&d, Some("Legacy"));
        assert_eq!(input.hint(false), Some(FieldHint::UnknownOption("Legacy".into())));
        assert_eq!(input.serialize(), "Legacy");
    }
}

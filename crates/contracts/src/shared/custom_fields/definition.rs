use super::error::CustomFieldError;
use super::field_type::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Определение пользовательского поля для одного типа сущности.
///
/// `field_key` уникален в пределах `entity_type` и после создания не
/// меняется: по нему хранятся значения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    pub entity_type: String,
    pub field_key: String,
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub options_json: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl FieldDefinition {
    /// Варианты выбора для SELECT (пустой список, если JSON не разобрался)
    pub fn options(&self) -> Vec<String> {
        if self.field_type.has_options() {
            parse_options(self.options_json.as_deref())
        } else {
            Vec::new()
        }
    }

    /// Применить изменения администратора. Ключ поля не меняется.
    pub fn apply_patch(&mut self, patch: &FieldDefinitionPatch) -> Result<(), CustomFieldError> {
        let field_name = match &patch.field_name {
            Some(name) => validate_field_name(name)?,
            None => self.field_name.clone(),
        };
        let field_type = match &patch.field_type {
            Some(tag) => FieldType::parse_strict(tag)?,
            None => self.field_type,
        };
        let options_source = match &patch.options_json {
            Some(raw) => Some(raw.as_str()),
            None => self.options_json.as_deref(),
        };
        let options_json = normalize_options(field_type, options_source)?;

        self.field_name = field_name;
        self.field_type = field_type;
        self.options_json = options_json;
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// DTO для создания определения поля
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionDto {
    pub entity_type: String,
    /// Если не задан, выводится из `field_name`
    #[serde(default)]
    pub field_key: Option<String>,
    pub field_name: String,
    pub field_type: String,
    #[serde(default)]
    pub options_json: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl FieldDefinitionDto {
    /// Проверить DTO и построить новое (активное) определение
    pub fn into_definition(self, id: String) -> Result<FieldDefinition, CustomFieldError> {
        let entity_type = self.entity_type.trim().to_string();
        if entity_type.is_empty() {
            return Err(CustomFieldError::Validation("Entity type is required".into()));
        }
        let field_name = validate_field_name(&self.field_name)?;
        let field_type = FieldType::parse_strict(&self.field_type)?;
        let field_key = match self.field_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => validate_field_key(key)?,
            _ => derive_field_key(&field_name)?,
        };
        let options_json = normalize_options(field_type, self.options_json.as_deref())?;

        let now = Utc::now();
        Ok(FieldDefinition {
            id,
            entity_type,
            field_key,
            field_name,
            field_type,
            options_json,
            required: self.required,
            active: true,
            sort_order: self.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Изменение определения. Поля `field_key` и `entity_type` здесь нет намеренно:
/// они неизменяемы после создания.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionPatch {
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub field_type: Option<String>,
    /// Новый список вариантов. Для SELECT пустой список отклоняется,
    /// остальные типы варианты не хранят
    #[serde(default)]
    pub options_json: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_field_name(name: &str) -> Result<String, CustomFieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CustomFieldError::Validation("Field name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_field_key(key: &str) -> Result<String, CustomFieldError> {
    let mut chars = key.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CustomFieldError::Validation(format!(
            "Invalid field key '{}': use letters, digits and '_', starting with a letter",
            key
        )));
    }
    Ok(key.to_string())
}

/// Вывести стабильный camelCase-ключ из названия поля ("Tax Id" -> "taxId")
pub fn derive_field_key(field_name: &str) -> Result<String, CustomFieldError> {
    let mut key = String::new();
    for word in field_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let lower = word.to_ascii_lowercase();
        if key.is_empty() {
            key.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                key.push(first.to_ascii_uppercase());
                key.push_str(chars.as_str());
            }
        }
    }

    if key.is_empty() {
        return Err(CustomFieldError::Validation(format!(
            "Cannot derive a field key from '{}', please enter one",
            field_name.trim()
        )));
    }
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert_str(0, "field");
    }
    Ok(key)
}

/// Мягкий разбор списка вариантов: при ошибке - пустой список
pub fn parse_options(options_json: Option<&str>) -> Vec<String> {
    options_json
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .unwrap_or_default()
}

/// Строгая проверка списка вариантов (используется перед сохранением)
pub fn validate_options(options_json: &str) -> Result<Vec<String>, CustomFieldError> {
    let options: Vec<String> = serde_json::from_str(options_json).map_err(|e| {
        CustomFieldError::Validation(format!("Options must be a JSON array of strings: {}", e))
    })?;

    if options.is_empty() {
        return Err(CustomFieldError::Validation(
            "A select field needs at least one option".into(),
        ));
    }

    let mut seen = HashSet::new();
    for option in &options {
        let trimmed = option.trim();
        if trimmed.is_empty() {
            return Err(CustomFieldError::Validation("Option names must not be empty".into()));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(CustomFieldError::Validation(format!(
                "Duplicate option: {}",
                trimmed
            )));
        }
    }

    Ok(options.into_iter().map(|o| o.trim().to_string()).collect())
}

/// Нормализовать варианты под тип поля: для SELECT - проверенный JSON,
/// для остальных типов варианты не хранятся.
fn normalize_options(
    field_type: FieldType,
    options_json: Option<&str>,
) -> Result<Option<String>, CustomFieldError> {
    if !field_type.has_options() {
        return Ok(None);
    }
    let raw = options_json.unwrap_or("").trim();
    if raw.is_empty() {
        return Err(CustomFieldError::Validation(
            "A select field needs at least one option".into(),
        ));
    }
    let options = validate_options(raw)?;
    serde_json::to_string(&options)
        .map(Some)
        .map_err(|e| CustomFieldError::Validation(e.to_string()))
}

/// Преобразовать текст формы (по строке на вариант) в JSON-массив.
/// Запятая - часть варианта, а не разделитель.
pub fn options_text_to_json(text: &str) -> String {
    let options: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .collect();
    serde_json::to_string(&options).unwrap_or_else(|_| "[]".to_string())
}

/// Обратное преобразование для редактирования в форме
pub fn options_json_to_text(options_json: Option<&str>) -> String {
    parse_options(options_json).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str, field_type: &str) -> FieldDefinitionDto {
        FieldDefinitionDto {
            entity_type: "bank".into(),
            field_name: name.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_field_key() {
        assert_eq!(derive_field_key("Tax Id").unwrap(), "taxId");
        assert_eq!(derive_field_key("branch code").unwrap(), "branchCode");
        assert_eq!(derive_field_key("  Risk-TIER ").unwrap(), "riskTier");
        assert_eq!(derive_field_key("2nd phone").unwrap(), "field2ndPhone");
        assert!(derive_field_key("***").is_err());
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let err = dto("  ", "TEXT").into_definition("1".into()).unwrap_err();
        assert!(matches!(err, CustomFieldError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_unsupported_type() {
        let err = dto("Color", "COLOR").into_definition("1".into()).unwrap_err();
        assert_eq!(err, CustomFieldError::Validation("Unsupported field type: COLOR".into()));
    }

    #[test]
    fn test_create_uses_explicit_key_and_defaults() {
        let mut d = dto("Tax identifier", "TEXT");
        d.field_key = Some("taxId".into());
        d.required = true;
        d.options_json = Some(r#"["ignored"]"#.into());
        let def = d.into_definition("id-1".into()).unwrap();
        assert_eq!(def.field_key, "taxId");
        assert!(def.active);
        assert!(def.required);
        assert_eq!(def.options_json, None);
    }

    #[test]
    fn test_create_rejects_bad_key() {
        let mut d = dto("Tax", "TEXT");
        d.field_key = Some("tax id".into());
        assert!(d.into_definition("1".into()).is_err());
    }

    #[test]
    fn test_select_requires_valid_options() {
        let mut d = dto("Risk tier", "SELECT");
        d.options_json = Some("not json".into());
        assert!(d.clone().into_definition("1".into()).is_err());

        d.options_json = Some(r#"["Low","low"]"#.into());
        let err = d.clone().into_definition("1".into()).unwrap_err();
        assert_eq!(err, CustomFieldError::Validation("Duplicate option: low".into()));

        d.options_json = Some(r#"["Low","Medium","High"]"#.into());
        let def = d.into_definition("1".into()).unwrap();
        assert_eq!(def.options(), vec!["Low", "Medium", "High"]);
    }

    #[test]
    fn test_parse_options_is_fail_soft() {
        assert!(parse_options(Some("[broken")).is_empty());
        assert!(parse_options(Some(r#"{"a":1}"#)).is_empty());
        assert!(parse_options(None).is_empty());
        assert_eq!(parse_options(Some(r#"["A"]"#)), vec!["A"]);
    }

    #[test]
    fn test_patch_keeps_key_and_validates() {
        let mut def = dto("Branch code", "TEXT").into_definition("1".into()).unwrap();
        let patch = FieldDefinitionPatch {
            field_name: Some("Branch".into()),
            active: Some(false),
            ..Default::default()
        };
        def.apply_patch(&patch).unwrap();
        assert_eq!(def.field_key, "branchCode");
        assert_eq!(def.field_name, "Branch");
        assert!(!def.active);

        let bad = FieldDefinitionPatch {
            field_type: Some("SELECT".into()),
            ..Default::default()
        };
        assert!(def.apply_patch(&bad).is_err());
        assert_eq!(def.field_type, FieldType::Text);
    }

    #[test]
    fn test_options_text_conversion() {
        let json = options_text_to_json("Low\n Medium \r\nHigh\n\n");
        assert_eq!(json, r#"["Low","Medium","High"]"#);
        assert_eq!(options_json_to_text(Some(&json)), "Low\nMedium\nHigh");
    }

    #[test]
    fn test_patch_with_empty_options() {
        let mut select = dto("Risk Tier", "SELECT");
        select.options_json = Some(r#"["Low","High"]"#.into());
        let mut def = select.into_definition("1".into()).unwrap();
        let clear = FieldDefinitionPatch {
            options_json: Some(String::new()),
            ..Default::default()
        };
        assert!(def.apply_patch(&clear).is_err());
        assert_eq!(def.options(), vec!["Low", "High"]);

        let to_text = FieldDefinitionPatch {
            field_type: Some("TEXT".into()),
            options_json: Some(String::new()),
            ..Default::default()
        };
        def.apply_patch(&to_text).unwrap();
        assert_eq!(def.options_json, None);
    }

    #[test]
    fn test_options_text_keeps_commas_inside_option() {
        let json = options_text_to_json("Large, heavy\nSmall");
        assert_eq!(json, r#"["Large, heavy","Small"]"#);
        assert_eq!(parse_options(Some(&json)), vec!["Large, heavy", "Small"]);
    }

    #[test]
    fn test_definition_wire_format_is_camel_case() {
        let def = dto("Tax Id", "TEXT").into_definition("1".into()).unwrap();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["fieldKey"], "taxId");
        assert_eq!(json["fieldType"], "TEXT");
        assert_eq!(json["entityType"], "bank");
    }
}

//! Колонки таблиц и план сохранения значений

use super::definition::FieldDefinition;
use super::field_type::FieldType;
use super::input::FieldInput;
use super::value::FieldValues;

/// Маркер пустой ячейки в таблицах
pub const EMPTY_CELL: &str = "-";

/// Активные определения в порядке отображения (sort_order, затем исходный порядок)
pub fn active_columns(definitions: &[FieldDefinition]) -> Vec<FieldDefinition> {
    let mut columns: Vec<FieldDefinition> = definitions.iter().filter(|d| d.active).cloned().collect();
    // sort_by_key стабилен: при равном sort_order сохраняется порядок сервера
    columns.sort_by_key(|d| d.sort_order);
    columns
}

/// Текст ячейки таблицы для одной сущности и одного поля
pub fn display_cell(values: Option<&FieldValues>, definition: &FieldDefinition) -> String {
    let raw = values
        .and_then(|v| v.get(&definition.field_key))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty());

    match (raw, definition.field_type) {
        (None, _) => EMPTY_CELL.to_string(),
        (Some(v), FieldType::Boolean) => {
            if v.eq_ignore_ascii_case("true") {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        }
        (Some(v), _) => v.to_string(),
    }
}

/// Значения для записи: ровно одно на каждое активное определение.
///
/// Значение проходит через контракт своего типа, поэтому BOOLEAN всегда
/// становится "true"/"false", а незаполненные поля сохраняются пустой
/// строкой. Ключи без активного определения не отправляются.
pub fn plan_upserts(active: &[FieldDefinition], form_values: &FieldValues) -> FieldValues {
    active
        .iter()
        .filter(|d| d.active)
        .map(|d| {
            let stored = form_values.get(&d.field_key).map(String::as_str);
            let value = FieldInput::from_definition(d, stored).serialize();
            (d.field_key.clone(), value)
        })
        .collect()
}

/// Значения формы редактирования пользовательских полей.
///
/// Пока сохранённые значения существующей сущности не загружены, план
/// записи содержит только поля, изменённые пользователем. Остальные ключи
/// не отправляются и не затираются пустыми строками.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValuesDraft {
    stored: FieldValues,
    edits: FieldValues,
    loaded: bool,
}

impl FieldValuesDraft {
    /// Новая сущность: загружать нечего
    pub fn fresh() -> Self {
        Self {
            loaded: true,
            ..Default::default()
        }
    }

    /// Существующая сущность, значения ещё не получены
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Загруженные значения ложатся под уже сделанные правки
    pub fn apply_loaded(&mut self, stored: FieldValues) {
        self.stored = stored;
        self.loaded = true;
    }

    pub fn edit(&mut self, field_key: impl Into<String>, value: impl Into<String>) {
        self.edits.insert(field_key.into(), value.into());
    }

    pub fn value(&self, field_key: &str) -> Option<&str> {
        self.edits
            .get(field_key)
            .or_else(|| self.stored.get(field_key))
            .map(String::as_str)
    }

    /// План записи для текущего состояния (см. `plan_upserts`)
    pub fn plan(&self, active: &[FieldDefinition]) -> FieldValues {
        let mut current = self.stored.clone();
        current.extend(self.edits.iter().map(|(k, v)| (k.clone(), v.clone())));

        let planned = plan_upserts(active, &current);
        if self.loaded {
            planned
        } else {
            planned
                .into_iter()
                .filter(|(key, _)| self.edits.contains_key(key))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::custom_fields::definition::FieldDefinitionDto;

    fn def(key: &str, field_type: &str, sort_order: i32) -> FieldDefinition {
        FieldDefinitionDto {
            entity_type: "bank".into(),
            field_key: Some(key.into()),
            field_name: key.into(),
            field_type: field_type.into(),
            options_json: (field_type == "SELECT").then(|| r#"["Low","Medium","High"]"#.into()),
            sort_order: Some(sort_order),
            ..Default::default()
        }
        .into_definition(key.into())
        .unwrap()
    }

    #[test]
    fn test_active_columns_skip_inactive_and_keep_order() {
        let mut hidden = def("hidden", "TEXT", 0);
        hidden.active = false;
        let defs = vec![def("b", "TEXT", 1), hidden, def("a", "TEXT", 0), def("c", "TEXT", 1)];
        let keys: Vec<String> = active_columns(&defs).into_iter().map(|d| d.field_key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display_cell_does_not_leak_between_rows() {
        let branch = def("branchCode", "TEXT", 0);
        let mut a = FieldValues::new();
        a.insert("branchCode".into(), "B001".into());
        let b = FieldValues::new();

        assert_eq!(display_cell(Some(&a), &branch), "B001");
        assert_eq!(display_cell(Some(&b), &branch), EMPTY_CELL);
        assert_eq!(display_cell(None, &branch), EMPTY_CELL);
    }

    #[test]
    fn test_display_cell_for_boolean_and_blank() {
        let flag = def("vip", "BOOLEAN", 0);
        let mut values = FieldValues::new();
        values.insert("vip".into(), "true".into());
        assert_eq!(display_cell(Some(&values), &flag), "Yes");
        values.insert("vip".into(), "false".into());
        assert_eq!(display_cell(Some(&values), &flag), "No");

        let text = def("note", "TEXT", 0);
        values.insert("note".into(), "   ".into());
        assert_eq!(display_cell(Some(&values), &text), EMPTY_CELL);
    }

    #[test]
    fn test_plan_upserts_covers_every_active_definition() {
        let mut inactive = def("old", "TEXT", 0);
        inactive.active = false;
        let defs = vec![def("taxId", "TEXT", 0), def("vip", "BOOLEAN", 1), inactive];

        let mut form = FieldValues::new();
        form.insert("old".into(), "ignored".into());
        form.insert("stray".into(), "ignored".into());

        let plan = plan_upserts(&defs, &form);
        let expected: FieldValues = [("taxId", ""), ("vip", "false")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(plan, expected);
    }

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pending_draft_plans_nothing_before_values_load() {
        let defs = vec![def("branchCode", "TEXT", 0), def("vip", "BOOLEAN", 1)];
        let draft = FieldValuesDraft::pending();

        assert!(!draft.is_loaded());
        assert!(draft.plan(&defs).is_empty());
    }

    #[test]
    fn test_pending_draft_plans_only_edited_fields() {
        let defs = vec![def("branchCode", "TEXT", 0), def("vip", "BOOLEAN", 1)];
        let mut draft = FieldValuesDraft::pending();
        draft.edit("vip", "true");

        assert_eq!(draft.plan(&defs), values(&[("vip", "true")]));
    }

    #[test]
    fn test_loaded_values_go_under_earlier_edits() {
        let defs = vec![
            def("branchCode", "TEXT", 0),
            def("taxId", "TEXT", 1),
            def("vip", "BOOLEAN", 2),
        ];
        let mut draft = FieldValuesDraft::pending();
        draft.edit("taxId", "7701");
        draft.apply_loaded(values(&[("branchCode", "B001"), ("taxId", "old")]));

        assert!(draft.is_loaded());
        assert_eq!(draft.value("branchCode"), Some("B001"));
        assert_eq!(draft.value("taxId"), Some("7701"));
        assert_eq!(
            draft.plan(&defs),
            values(&[("branchCode", "B001"), ("taxId", "7701"), ("vip", "false")])
        );
    }

    #[test]
    fn test_fresh_draft_plans_every_active_field() {
        let defs = vec![def("branchCode", "TEXT", 0), def("vip", "BOOLEAN", 1)];
        let draft = FieldValuesDraft::fresh();

        assert_eq!(draft.plan(&defs), values(&[("branchCode", ""), ("vip", "false")]));
    }
}

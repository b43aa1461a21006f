use super::{definition_repository, value_repository};
use contracts::shared::custom_fields::{
    BatchUpsertReport, CustomFieldError, EntityFieldValues, FieldDefinition, FieldDefinitionDto,
    FieldDefinitionPatch, FieldValue, FieldValues, UpsertFieldValueRequest, UpsertOutcome,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use uuid::Uuid;

fn not_found(id: &str) -> anyhow::Error {
    CustomFieldError::NotFound(format!("Field definition {}", id)).into()
}

fn require(value: &str, what: &str) -> Result<(), CustomFieldError> {
    if value.trim().is_empty() {
        return Err(CustomFieldError::Validation(format!("{} is required", what)));
    }
    Ok(())
}

// ============================================================================
// Field definitions
// ============================================================================

/// Определения полей типа сущности (активные и неактивные)
pub async fn list_definitions(
    db: &DatabaseConnection,
    entity_type: &str,
) -> anyhow::Result<Vec<FieldDefinition>> {
    Ok(definition_repository::list_by_entity(db, entity_type).await?)
}

pub async fn get_definition(db: &DatabaseConnection, id: &str) -> anyhow::Result<FieldDefinition> {
    definition_repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Создание определения. Ключ уникален в пределах типа сущности.
pub async fn create_definition(
    db: &DatabaseConnection,
    dto: FieldDefinitionDto,
) -> anyhow::Result<FieldDefinition> {
    let definition = dto.into_definition(Uuid::new_v4().to_string())?;

    if definition_repository::find_by_key(db, &definition.entity_type, &definition.field_key)
        .await?
        .is_some()
    {
        return Err(CustomFieldError::Validation(format!(
            "Field key '{}' already exists for {}",
            definition.field_key, definition.entity_type
        ))
        .into());
    }

    definition_repository::insert(db, &definition).await?;
    tracing::info!(
        "Field definition created: {}.{} ({})",
        definition.entity_type,
        definition.field_key,
        definition.field_type
    );
    Ok(definition)
}

pub async fn update_definition(
    db: &DatabaseConnection,
    id: &str,
    patch: FieldDefinitionPatch,
) -> anyhow::Result<FieldDefinition> {
    let mut definition = get_definition(db, id).await?;
    definition.apply_patch(&patch)?;
    definition_repository::update(db, &definition).await?;
    Ok(definition)
}

/// Деактивация и повторная активация. Значения поля не трогаются.
pub async fn set_definition_active(
    db: &DatabaseConnection,
    id: &str,
    active: bool,
) -> anyhow::Result<FieldDefinition> {
    if !definition_repository::set_active(db, id, active).await? {
        return Err(not_found(id));
    }
    get_definition(db, id).await
}

/// Удаление определения вместе со всеми значениями этого поля.
/// Ключ после удаления можно использовать заново без «воскрешения» старых данных.
pub async fn delete_definition(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let definition = get_definition(db, id).await?;
    let purged =
        value_repository::delete_for_key(db, &definition.entity_type, &definition.field_key)
            .await?;
    definition_repository::delete(db, id).await?;
    tracing::info!(
        "Field definition deleted: {}.{} ({} value(s) purged)",
        definition.entity_type,
        definition.field_key,
        purged
    );
    Ok(())
}

// ============================================================================
// Field values
// ============================================================================

/// Значения одной сущности. Отсутствие значений не ошибка.
pub async fn fetch_values(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: &str,
) -> anyhow::Result<FieldValues> {
    Ok(value_repository::fetch_for_entity(db, entity_type, entity_id).await?)
}

pub async fn fetch_values_for_entities(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_ids: &[String],
) -> anyhow::Result<EntityFieldValues> {
    Ok(value_repository::fetch_for_entities(db, entity_type, entity_ids).await?)
}

/// Запись одного значения (идемпотентно)
pub async fn upsert_value(
    db: &DatabaseConnection,
    request: &UpsertFieldValueRequest,
) -> anyhow::Result<FieldValue> {
    require(&request.entity_type, "Entity type")?;
    require(&request.entity_id, "Entity id")?;
    require(&request.field_key, "Field key")?;

    let stored = value_repository::upsert(
        db,
        &request.entity_type,
        &request.entity_id,
        &request.field_key,
        &request.value,
    )
    .await?;
    Ok(stored)
}

/// Пакетная запись значений формы. Каждый ключ пишется отдельно,
/// ошибка по одному ключу не откатывает остальные.
pub async fn batch_upsert(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: &str,
    values: &FieldValues,
) -> anyhow::Result<BatchUpsertReport> {
    require(entity_type, "Entity type")?;
    require(entity_id, "Entity id")?;

    let mut report = BatchUpsertReport::default();
    for (field_key, value) in values {
        if field_key.trim().is_empty() {
            report.push(UpsertOutcome::failed(field_key, "Field key is required"));
            continue;
        }
        match value_repository::upsert(db, entity_type, entity_id, field_key, value).await {
            Ok(_) => report.push(UpsertOutcome::saved(field_key)),
            Err(e) => {
                tracing::warn!(
                    "Failed to save field {} for {} {}: {}",
                    field_key,
                    entity_type,
                    entity_id,
                    e
                );
                report.push(UpsertOutcome::failed(field_key, e.to_string()));
            }
        }
    }

    if !report.is_complete() {
        tracing::warn!(
            "Partial save for {} {}: failed keys {:?}",
            entity_type,
            entity_id,
            report.failed_keys()
        );
    }
    Ok(report)
}

/// Удалить значения полей сущности (вызывается при удалении сущности)
pub async fn purge_entity<C: ConnectionTrait>(
    db: &C,
    entity_type: &str,
    entity_id: &str,
) -> anyhow::Result<u64> {
    Ok(value_repository::delete_for_entity(db, entity_type, entity_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use contracts::shared::custom_fields::{
        active_columns, display_cell, plan_upserts, FieldInput, FieldType, FieldValuesDraft,
    };

    fn dto(entity_type: &str, field_name: &str, field_type: &str) -> FieldDefinitionDto {
        FieldDefinitionDto {
            entity_type: entity_type.into(),
            field_name: field_name.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    fn is_validation(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<CustomFieldError>(),
            Some(CustomFieldError::Validation(_))
        )
    }

    #[tokio::test]
    async fn test_list_has_no_cross_entity_leakage() {
        let db = test_connection().await;
        create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        create_definition(&db, dto("product", "Color", "TEXT")).await.unwrap();
        let mut risk = dto("bank", "Risk Tier", "SELECT");
        risk.options_json = Some(r#"["Low","High"]"#.into());
        create_definition(&db, risk).await.unwrap();

        let banks = list_definitions(&db, "bank").await.unwrap();
        assert_eq!(banks.len(), 2);
        assert!(banks.iter().all(|d| d.entity_type == "bank"));

        let products = list_definitions(&db, "product").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].field_key, "color");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = test_connection().await;

        let err = create_definition(&db, dto("bank", "  ", "TEXT")).await.unwrap_err();
        assert!(is_validation(&err));

        let err = create_definition(&db, dto("bank", "Rating", "STARS")).await.unwrap_err();
        assert!(is_validation(&err));

        let mut bad_options = dto("bank", "Tier", "SELECT");
        bad_options.options_json = Some(r#"["Low","low"]"#.into());
        let err = create_definition(&db, bad_options).await.unwrap_err();
        assert!(is_validation(&err));

        assert!(list_definitions(&db, "bank").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected_per_entity_type() {
        let db = test_connection().await;
        create_definition(&db, dto("bank", "Tax Id", "TEXT")).await.unwrap();

        let err = create_definition(&db, dto("bank", "Tax ID", "NUMBER")).await.unwrap_err();
        assert!(is_validation(&err));
        assert!(err.to_string().contains("taxId"));

        // Тот же ключ у другого типа сущности допустим
        create_definition(&db, dto("product", "Tax Id", "TEXT")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeps_field_key() {
        let db = test_connection().await;
        let created = create_definition(&db, dto("bank", "Tax Id", "TEXT")).await.unwrap();

        let patch = FieldDefinitionPatch {
            field_name: Some("Taxpayer number".into()),
            required: Some(true),
            ..Default::default()
        };
        let updated = update_definition(&db, &created.id, patch).await.unwrap();
        assert_eq!(updated.field_key, "taxId");
        assert_eq!(updated.field_name, "Taxpayer number");
        assert!(updated.required);

        let stored = get_definition(&db, &created.id).await.unwrap();
        assert_eq!(stored.field_name, "Taxpayer number");
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_missing_definition_is_not_found() {
        let db = test_connection().await;
        let err = set_definition_active(&db, "missing", false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CustomFieldError>(),
            Some(CustomFieldError::NotFound(_))
        ));
        assert!(delete_definition(&db, "missing").await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_round_trip_is_idempotent() {
        let db = test_connection().await;
        assert!(fetch_values(&db, "bank", "b1").await.unwrap().is_empty());

        let request = UpsertFieldValueRequest {
            entity_type: "bank".into(),
            entity_id: "b1".into(),
            field_key: "branchCode".into(),
            value: "B001".into(),
        };
        upsert_value(&db, &request).await.unwrap();
        let stored = upsert_value(&db, &request).await.unwrap();
        assert_eq!(stored.field_key, "branchCode");
        assert_eq!(stored.value, "B001");

        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("branchCode").map(String::as_str), Some("B001"));

        let overwrite = UpsertFieldValueRequest {
            value: "B002".into(),
            ..request
        };
        upsert_value(&db, &overwrite).await.unwrap();
        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(values.get("branchCode").map(String::as_str), Some("B002"));
    }

    #[tokio::test]
    async fn test_deactivate_reactivate_is_lossless() {
        let db = test_connection().await;
        let def = create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        batch_upsert(&db, "bank", "b1", &values).await.unwrap();

        let inactive = set_definition_active(&db, &def.id, false).await.unwrap();
        assert!(!inactive.active);
        let all = list_definitions(&db, "bank").await.unwrap();
        assert!(active_columns(&all).is_empty());
        assert_eq!(
            fetch_values(&db, "bank", "b1").await.unwrap().get("branchCode").map(String::as_str),
            Some("B001")
        );

        set_definition_active(&db, &def.id, true).await.unwrap();
        let all = list_definitions(&db, "bank").await.unwrap();
        let columns = active_columns(&all);
        assert_eq!(columns.len(), 1);
        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(display_cell(Some(&values), &columns[0]), "B001");
    }

    #[tokio::test]
    async fn test_delete_definition_cascades_to_values() {
        let db = test_connection().await;
        let def = create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        values.insert("legacy".into(), "keep".into());
        batch_upsert(&db, "bank", "b1", &values).await.unwrap();

        delete_definition(&db, &def.id).await.unwrap();

        let remaining = fetch_values(&db, "bank", "b1").await.unwrap();
        assert!(!remaining.contains_key("branchCode"));
        assert_eq!(remaining.get("legacy").map(String::as_str), Some("keep"));

        // Новое поле с тем же ключом начинает с пустыми значениями
        create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        assert!(!fetch_values(&db, "bank", "b1").await.unwrap().contains_key("branchCode"));
    }

    #[tokio::test]
    async fn test_batch_upsert_reports_per_key_outcomes() {
        let db = test_connection().await;
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        values.insert(" ".into(), "x".into());

        let report = batch_upsert(&db, "bank", "b1", &values).await.unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.saved_keys(), vec!["branchCode".to_string()]);
        assert_eq!(report.failed_keys(), vec![" ".to_string()]);

        let stored = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_required_text_is_saved_as_empty_string() {
        let db = test_connection().await;
        let mut tax = dto("bank", "Tax Id", "TEXT");
        tax.required = true;
        let def = create_definition(&db, tax).await.unwrap();

        // Подсказка видна, но сохранение не блокируется
        let input = FieldInput::from_definition(&def, None);
        assert!(input.hint(def.required).is_some());

        let active = active_columns(&list_definitions(&db, "bank").await.unwrap());
        let plan = plan_upserts(&active, &FieldValues::new());
        let report = batch_upsert(&db, "bank", "new-bank", &plan).await.unwrap();
        assert!(report.is_complete());

        let values = fetch_values(&db, "bank", "new-bank").await.unwrap();
        assert_eq!(values.get("taxId").map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn test_dynamic_columns_do_not_leak_between_rows() {
        let db = test_connection().await;
        create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        batch_upsert(&db, "bank", "a", &values).await.unwrap();

        let columns = active_columns(&list_definitions(&db, "bank").await.unwrap());
        let ids = vec!["a".to_string(), "b".to_string()];
        let by_entity = fetch_values_for_entities(&db, "bank", &ids).await.unwrap();

        assert_eq!(display_cell(by_entity.get("a"), &columns[0]), "B001");
        assert_eq!(display_cell(by_entity.get("b"), &columns[0]), "-");
    }

    #[tokio::test]
    async fn test_select_value_survives_reload() {
        let db = test_connection().await;
        let mut risk = dto("bank", "Risk Tier", "SELECT");
        risk.options_json = Some(r#"["Low","Medium","High"]"#.into());
        let def = create_definition(&db, risk).await.unwrap();
        assert_eq!(def.field_type, FieldType::Select);

        let mut input = FieldInput::from_definition(&def, None);
        input.apply("Medium");
        let mut form = FieldValues::new();
        form.insert(def.field_key.clone(), input.serialize());
        let plan = plan_upserts(&[def.clone()], &form);
        batch_upsert(&db, "bank", "b1", &plan).await.unwrap();

        let reloaded = get_definition(&db, &def.id).await.unwrap();
        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        let input = FieldInput::from_definition(&reloaded, values.get("riskTier").map(String::as_str));
        assert_eq!(input.serialize(), "Medium");
        assert!(input.hint(false).is_none());
    }

    #[tokio::test]
    async fn test_purge_entity_removes_only_its_values() {
        let db = test_connection().await;
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        batch_upsert(&db, "bank", "a", &values).await.unwrap();
        batch_upsert(&db, "bank", "b", &values).await.unwrap();
        batch_upsert(&db, "product", "a", &values).await.unwrap();

        assert_eq!(purge_entity(&db, "bank", "a").await.unwrap(), 1);
        assert!(fetch_values(&db, "bank", "a").await.unwrap().is_empty());
        assert_eq!(fetch_values(&db, "bank", "b").await.unwrap().len(), 1);
        assert_eq!(fetch_values(&db, "product", "a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_form_save_keeps_values_it_never_loaded() {
        let db = test_connection().await;
        create_definition(&db, dto("bank", "Branch Code", "TEXT")).await.unwrap();
        create_definition(&db, dto("bank", "Tax Id", "TEXT")).await.unwrap();
        let active = active_columns(&list_definitions(&db, "bank").await.unwrap());

        let mut stored = FieldValues::new();
        stored.insert("branchCode".into(), "B001".into());
        stored.insert("taxId".into(), "7701".into());
        batch_upsert(&db, "bank", "b1", &stored).await.unwrap();

        // Сохранение до загрузки значений: отправляются только правки
        let mut draft = FieldValuesDraft::pending();
        let report = batch_upsert(&db, "bank", "b1", &draft.plan(&active)).await.unwrap();
        assert!(report.outcomes.is_empty());

        draft.edit("taxId", "7702");
        batch_upsert(&db, "bank", "b1", &draft.plan(&active)).await.unwrap();
        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(values.get("branchCode").map(String::as_str), Some("B001"));
        assert_eq!(values.get("taxId").map(String::as_str), Some("7702"));

        // После загрузки правка остаётся поверх сохранённого
        draft.edit("taxId", "7703");
        draft.apply_loaded(fetch_values(&db, "bank", "b1").await.unwrap());
        batch_upsert(&db, "bank", "b1", &draft.plan(&active)).await.unwrap();
        let values = fetch_values(&db, "bank", "b1").await.unwrap();
        assert_eq!(values.get("branchCode").map(String::as_str), Some("B001"));
        assert_eq!(values.get("taxId").map(String::as_str), Some("7703"));
    }
}

//! Клиент хранилищ определений и значений пользовательских полей

use crate::shared::http::{self, with_query, Method};
use contracts::shared::custom_fields::{
    BatchUpsertReport, CustomFieldError, EntityFieldValues, FieldDefinition, FieldDefinitionDto,
    FieldDefinitionPatch, FieldValues,
};
use serde::Serialize;

#[derive(Serialize)]
struct EntityQuery<'a> {
    entity: &'a str,
}

#[derive(Serialize)]
struct EntityInstanceQuery<'a> {
    entity: &'a str,
    #[serde(rename = "entityId")]
    entity_id: &'a str,
}

#[derive(Serialize)]
struct EntitiesQuery<'a> {
    entity: &'a str,
    #[serde(rename = "entityIds")]
    entity_ids: String,
}

// ============================================================================
// FieldDefinitionStore
// ============================================================================

/// Все определения типа сущности, включая неактивные
pub async fn list_definitions(entity_type: &str) -> Result<Vec<FieldDefinition>, CustomFieldError> {
    let path = with_query("/api/fields", &EntityQuery { entity: entity_type })?;
    http::get_json(&path).await
}

pub async fn create_definition(dto: &FieldDefinitionDto) -> Result<FieldDefinition, CustomFieldError> {
    http::send_json(Method::Post, "/api/fields", dto).await
}

pub async fn update_definition(
    id: &str,
    patch: &FieldDefinitionPatch,
) -> Result<FieldDefinition, CustomFieldError> {
    http::send_json(Method::Put, &format!("/api/fields/{}", id), patch).await
}

pub async fn deactivate_definition(id: &str) -> Result<FieldDefinition, CustomFieldError> {
    http::send_for_json(Method::Post, &format!("/api/fields/{}/deactivate", id)).await
}

pub async fn activate_definition(id: &str) -> Result<FieldDefinition, CustomFieldError> {
    http::send_for_json(Method::Post, &format!("/api/fields/{}/activate", id)).await
}

pub async fn delete_definition(id: &str) -> Result<(), CustomFieldError> {
    http::send_no_content(Method::Delete, &format!("/api/fields/{}", id)).await
}

// ============================================================================
// FieldValueStore
// ============================================================================

/// Значения одной сущности; пустая карта, если ничего не сохранено
pub async fn fetch_values(entity_type: &str, entity_id: &str) -> Result<FieldValues, CustomFieldError> {
    let path = with_query(
        "/api/field-values",
        &EntityInstanceQuery {
            entity: entity_type,
            entity_id,
        },
    )?;
    http::get_json(&path).await
}

/// Сколько ID уходит в одном запросе `by-entities` (ограничение длины URI)
const ENTITY_IDS_PER_REQUEST: usize = 100;

/// Значения сразу для всех строк списка: один запрос на каждые
/// `ENTITY_IDS_PER_REQUEST` строк вместо запроса на строку
pub async fn fetch_values_for_entities(
    entity_type: &str,
    entity_ids: &[String],
) -> Result<EntityFieldValues, CustomFieldError> {
    let mut result = EntityFieldValues::new();
    for query in entities_queries(entity_type, entity_ids) {
        let path = with_query("/api/field-values/by-entities", &query)?;
        let chunk: EntityFieldValues = http::get_json(&path).await?;
        result.extend(chunk);
    }
    Ok(result)
}

fn entities_queries<'a>(entity_type: &'a str, entity_ids: &[String]) -> Vec<EntitiesQuery<'a>> {
    entity_ids
        .chunks(ENTITY_IDS_PER_REQUEST)
        .map(|chunk| EntitiesQuery {
            entity: entity_type,
            entity_ids: chunk.join(","),
        })
        .collect()
}

/// Пакетная запись. Результат по каждому ключу, без атомарности.
pub async fn batch_upsert(
    entity_type: &str,
    entity_id: &str,
    values: &FieldValues,
) -> Result<BatchUpsertReport, CustomFieldError> {
    let path = with_query(
        "/api/field-values/batch",
        &EntityInstanceQuery {
            entity: entity_type,
            entity_id,
        },
    )?;
    http::send_json(Method::Post, &path, values).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_queries_split_long_id_lists() {
        assert!(entities_queries("bank", &[]).is_empty());

        let ids: Vec<String> = (0..250).map(|i| format!("id{}", i)).collect();
        let queries = entities_queries("bank", &ids);
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|q| q.entity == "bank"));

        let sizes: Vec<usize> = queries.iter().map(|q| q.entity_ids.split(',').count()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(queries[0].entity_ids.starts_with("id0,id1,"));
        assert!(queries[2].entity_ids.ends_with("id249"));
    }
}

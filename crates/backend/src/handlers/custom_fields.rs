use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::shared::custom_fields::{
    BatchUpsertReport, EntityFieldValues, FieldDefinition, FieldDefinitionDto,
    FieldDefinitionPatch, FieldValue, FieldValues, UpsertFieldValueRequest,
};
use serde::Deserialize;

use crate::shared::api_error::{ApiError, ApiResult};
use crate::shared::custom_fields::service;
use crate::shared::data::db::get_connection;

#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    pub entity: String,
}

#[derive(Debug, Deserialize)]
pub struct EntityInstanceQuery {
    pub entity: String,
    #[serde(rename = "entityId")]
    pub entity_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EntitiesQuery {
    pub entity: String,
    /// Список ID через запятую
    #[serde(rename = "entityIds", default)]
    pub entity_ids: String,
}

impl EntitiesQuery {
    fn ids(&self) -> Vec<String> {
        self.entity_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn require_entity(entity: &str) -> ApiResult<()> {
    if entity.trim().is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'entity' is required".into()));
    }
    Ok(())
}

// ============================================================================
// Field definitions
// ============================================================================

/// GET /api/fields?entity=bank
pub async fn list_definitions(
    Query(query): Query<EntityQuery>,
) -> ApiResult<Json<Vec<FieldDefinition>>> {
    require_entity(&query.entity)?;
    let items = service::list_definitions(get_connection(), &query.entity).await?;
    Ok(Json(items))
}

/// GET /api/fields/:id
pub async fn get_definition(Path(id): Path<String>) -> ApiResult<Json<FieldDefinition>> {
    Ok(Json(service::get_definition(get_connection(), &id).await?))
}

/// POST /api/fields
pub async fn create_definition(
    Json(dto): Json<FieldDefinitionDto>,
) -> ApiResult<(StatusCode, Json<FieldDefinition>)> {
    let created = service::create_definition(get_connection(), dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/fields/:id
pub async fn update_definition(
    Path(id): Path<String>,
    Json(patch): Json<FieldDefinitionPatch>,
) -> ApiResult<Json<FieldDefinition>> {
    Ok(Json(service::update_definition(get_connection(), &id, patch).await?))
}

/// POST /api/fields/:id/deactivate
pub async fn deactivate_definition(Path(id): Path<String>) -> ApiResult<Json<FieldDefinition>> {
    Ok(Json(service::set_definition_active(get_connection(), &id, false).await?))
}

/// POST /api/fields/:id/activate
pub async fn activate_definition(Path(id): Path<String>) -> ApiResult<Json<FieldDefinition>> {
    Ok(Json(service::set_definition_active(get_connection(), &id, true).await?))
}

/// DELETE /api/fields/:id
pub async fn delete_definition(Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete_definition(get_connection(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Field values
// ============================================================================

/// GET /api/field-values?entity=bank&entityId=...
pub async fn fetch_values(Query(query): Query<EntityInstanceQuery>) -> ApiResult<Json<FieldValues>> {
    require_entity(&query.entity)?;
    let values = service::fetch_values(get_connection(), &query.entity, &query.entity_id).await?;
    Ok(Json(values))
}

/// GET /api/field-values/by-entities?entity=bank&entityIds=a,b,c
pub async fn fetch_values_for_entities(
    Query(query): Query<EntitiesQuery>,
) -> ApiResult<Json<EntityFieldValues>> {
    require_entity(&query.entity)?;
    let values =
        service::fetch_values_for_entities(get_connection(), &query.entity, &query.ids()).await?;
    Ok(Json(values))
}

/// PUT /api/field-values
pub async fn upsert_value(
    Json(request): Json<UpsertFieldValueRequest>,
) -> ApiResult<Json<FieldValue>> {
    Ok(Json(service::upsert_value(get_connection(), &request).await?))
}

/// POST /api/field-values/batch?entity=bank&entityId=...
pub async fn batch_upsert(
    Query(query): Query<EntityInstanceQuery>,
    Json(values): Json<FieldValues>,
) -> ApiResult<Json<BatchUpsertReport>> {
    let report =
        service::batch_upsert(get_connection(), &query.entity, &query.entity_id, &values).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_split_and_trimmed() {
        let query = EntitiesQuery {
            entity: "bank".into(),
            entity_ids: " a, b,,c ".into(),
        };
        assert_eq!(query.ids(), vec!["a", "b", "c"]);

        let empty = EntitiesQuery {
            entity: "bank".into(),
            entity_ids: String::new(),
        };
        assert!(empty.ids().is_empty());
    }
}

use chrono::Utc;
use contracts::shared::custom_fields::{EntityFieldValues, FieldValue, FieldValues};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

mod field_value {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sys_field_value")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub entity_type: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub entity_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub field_key: String,
        pub value: String,
        pub updated_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use field_value::{ActiveModel, Column, Entity};

// ============================================================================
// Repository functions
// ============================================================================

/// Значения одной сущности; пустая карта, если значений ещё нет
pub async fn fetch_for_entity(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: &str,
) -> Result<FieldValues, DbErr> {
    let models = Entity::find()
        .filter(Column::EntityType.eq(entity_type))
        .filter(Column::EntityId.eq(entity_id))
        .all(db)
        .await?;

    Ok(models.into_iter().map(|m| (m.field_key, m.value)).collect())
}

/// Значения нескольких сущностей одним запросом
pub async fn fetch_for_entities(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_ids: &[String],
) -> Result<EntityFieldValues, DbErr> {
    let mut result = EntityFieldValues::new();
    if entity_ids.is_empty() {
        return Ok(result);
    }

    let models = Entity::find()
        .filter(Column::EntityType.eq(entity_type))
        .filter(Column::EntityId.is_in(entity_ids.iter().cloned()))
        .order_by_asc(Column::EntityId)
        .all(db)
        .await?;

    for m in models {
        result
            .entry(m.entity_id)
            .or_default()
            .insert(m.field_key, m.value);
    }
    Ok(result)
}

/// Запись одного значения: INSERT ... ON CONFLICT DO UPDATE по составному ключу.
/// Повторный вызов с теми же аргументами даёт то же состояние.
pub async fn upsert(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: &str,
    field_key: &str,
    value: &str,
) -> Result<FieldValue, DbErr> {
    let stored = FieldValue {
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        field_key: field_key.to_string(),
        value: value.to_string(),
        updated_at: Utc::now(),
    };
    let active = ActiveModel {
        entity_type: Set(stored.entity_type.clone()),
        entity_id: Set(stored.entity_id.clone()),
        field_key: Set(stored.field_key.clone()),
        value: Set(stored.value.clone()),
        updated_at: Set(stored.updated_at),
    };

    Entity::insert(active)
        .on_conflict(
            OnConflict::columns([Column::EntityType, Column::EntityId, Column::FieldKey])
                .update_columns([Column::Value, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(stored)
}

/// Удалить все значения сущности (при удалении самой сущности).
/// Принимает и транзакцию, и соединение.
pub async fn delete_for_entity<C: ConnectionTrait>(
    db: &C,
    entity_type: &str,
    entity_id: &str,
) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::EntityType.eq(entity_type))
        .filter(Column::EntityId.eq(entity_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Удалить значения одного поля у всех сущностей типа
pub async fn delete_for_key(
    db: &DatabaseConnection,
    entity_type: &str,
    field_key: &str,
) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::EntityType.eq(entity_type))
        .filter(Column::FieldKey.eq(field_key))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

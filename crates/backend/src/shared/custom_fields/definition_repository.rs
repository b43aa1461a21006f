use contracts::shared::custom_fields::{FieldDefinition, FieldType};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

mod field_definition {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sys_field_definition")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub entity_type: String,
        pub field_key: String,
        pub field_name: String,
        pub field_type: String,
        pub options_json: Option<String>,
        pub required: bool,
        pub active: bool,
        pub sort_order: i32,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use field_definition::{ActiveModel, Column, Entity, Model};

impl From<Model> for FieldDefinition {
    fn from(m: Model) -> Self {
        FieldDefinition {
            id: m.id,
            entity_type: m.entity_type,
            field_key: m.field_key,
            field_name: m.field_name,
            // Неизвестный тип из БД отображается как TEXT
            field_type: FieldType::parse_lenient(&m.field_type),
            options_json: m.options_json,
            required: m.required,
            active: m.active,
            sort_order: m.sort_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn to_active_model(def: &FieldDefinition) -> ActiveModel {
    ActiveModel {
        id: Set(def.id.clone()),
        entity_type: Set(def.entity_type.clone()),
        field_key: Set(def.field_key.clone()),
        field_name: Set(def.field_name.clone()),
        field_type: Set(def.field_type.as_str().to_string()),
        options_json: Set(def.options_json.clone()),
        required: Set(def.required),
        active: Set(def.active),
        sort_order: Set(def.sort_order),
        created_at: Set(def.created_at),
        updated_at: Set(def.updated_at),
    }
}

// ============================================================================
// Repository functions
// ============================================================================

/// Все определения типа сущности (активные и неактивные)
pub async fn list_by_entity(
    db: &DatabaseConnection,
    entity_type: &str,
) -> Result<Vec<FieldDefinition>, DbErr> {
    let models = Entity::find()
        .filter(Column::EntityType.eq(entity_type))
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<FieldDefinition>, DbErr> {
    Ok(Entity::find_by_id(id.to_string()).one(db).await?.map(Into::into))
}

pub async fn find_by_key(
    db: &DatabaseConnection,
    entity_type: &str,
    field_key: &str,
) -> Result<Option<FieldDefinition>, DbErr> {
    let model = Entity::find()
        .filter(Column::EntityType.eq(entity_type))
        .filter(Column::FieldKey.eq(field_key))
        .one(db)
        .await?;
    Ok(model.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, def: &FieldDefinition) -> Result<(), DbErr> {
    to_active_model(def).insert(db).await?;
    Ok(())
}

/// Обновление всех изменяемых колонок. `entity_type`, `field_key` и
/// `created_at` не перезаписываются.
pub async fn update(db: &DatabaseConnection, def: &FieldDefinition) -> Result<(), DbErr> {
    let mut active = to_active_model(def);
    active.entity_type = sea_orm::ActiveValue::NotSet;
    active.field_key = sea_orm::ActiveValue::NotSet;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn set_active(db: &DatabaseConnection, id: &str, active: bool) -> Result<bool, DbErr> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Active, Expr::value(active))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

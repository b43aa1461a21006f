use super::repository;
use crate::shared::api_error::ApiError;
use crate::shared::custom_fields::service as custom_fields;
use contracts::domain::a002_product::aggregate::{Product, ProductDto};
use contracts::domain::common::{code_or_generated, AggregateRoot};
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

fn not_found(id: Uuid) -> anyhow::Error {
    ApiError::NotFound(format!("Product {}", id)).into()
}

/// Создание нового товара
pub async fn create(db: &DatabaseConnection, dto: ProductDto) -> anyhow::Result<Uuid> {
    let code = code_or_generated(dto.code.as_deref(), "PRD");
    let mut aggregate =
        Product::new_for_insert(code, dto.name, dto.sku, dto.price, dto.unit, dto.comment);

    aggregate.validate().map_err(ApiError::BadRequest)?;
    aggregate.before_write();

    repository::insert(db, &aggregate).await
}

/// Обновление существующего товара
pub async fn update(db: &DatabaseConnection, id: Uuid, dto: ProductDto) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(ApiError::BadRequest)?;
    aggregate.before_write();

    repository::update(db, &aggregate).await
}

/// Мягкое удаление товара вместе со значениями его пользовательских полей
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<()> {
    let txn = db.begin().await?;
    if !repository::soft_delete(&txn, id).await? {
        return Err(not_found(id));
    }
    let purged =
        custom_fields::purge_entity(&txn, Product::custom_fields_entity(), &id.to_string())
            .await?;
    txn.commit().await?;
    tracing::info!("Product {} deleted ({} custom field value(s) purged)", id, purged);
    Ok(())
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<Product>> {
    repository::get_by_id(db, id).await
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Product>> {
    repository::list_all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use contracts::shared::custom_fields::FieldValues;

    fn dto(name: &str, price: f64) -> ProductDto {
        ProductDto {
            name: name.into(),
            sku: "SKU-1".into(),
            price,
            unit: "pcs".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let db = test_connection().await;
        let id = create(&db, dto("Widget", 9.5)).await.unwrap();

        let product = get_by_id(&db, id).await.unwrap().unwrap();
        assert!(product.base.code.starts_with("PRD-"));
        assert_eq!(product.price, 9.5);

        let mut changed = ProductDto::from(&product);
        changed.price = 12.0;
        update(&db, id, changed).await.unwrap();
        assert_eq!(get_by_id(&db, id).await.unwrap().unwrap().price, 12.0);

        let mut values = FieldValues::new();
        values.insert("color".into(), "red".into());
        custom_fields::batch_upsert(&db, "product", &id.to_string(), &values)
            .await
            .unwrap();

        delete(&db, id).await.unwrap();
        assert!(list_all(&db).await.unwrap().is_empty());
        assert!(custom_fields::fetch_values(&db, "product", &id.to_string())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_negative_price_is_bad_request() {
        let db = test_connection().await;
        let err = create(&db, dto("Widget", -1.0)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::BadRequest(_))));

        let err = update(&db, Uuid::new_v4(), dto("Widget", 1.0)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_rolled_back_when_purge_fails() {
        use sea_orm::ConnectionTrait;

        let db = test_connection().await;
        let id = create(&db, dto("Kept Product", 10.0)).await.unwrap();
        db.execute_unprepared("DROP TABLE sys_field_value").await.unwrap();

        assert!(delete(&db, id).await.is_err());
        assert!(get_by_id(&db, id).await.unwrap().is_some());
    }
}

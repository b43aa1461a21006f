use super::repository;
use crate::shared::api_error::ApiError;
use crate::shared::custom_fields::service as custom_fields;
use contracts::domain::a001_bank::aggregate::{Bank, BankDto};
use contracts::domain::common::{code_or_generated, AggregateRoot};
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

fn not_found(id: Uuid) -> anyhow::Error {
    ApiError::NotFound(format!("Bank {}", id)).into()
}

/// Создание нового банка
pub async fn create(db: &DatabaseConnection, dto: BankDto) -> anyhow::Result<Uuid> {
    let code = code_or_generated(dto.code.as_deref(), "BNK");
    let mut aggregate = Bank::new_for_insert(
        code,
        dto.name,
        dto.address,
        dto.account_number,
        dto.swift,
        dto.comment,
    );

    // Валидация
    aggregate.validate().map_err(ApiError::BadRequest)?;

    // Before write
    aggregate.before_write();

    repository::insert(db, &aggregate).await
}

/// Обновление существующего банка
pub async fn update(db: &DatabaseConnection, id: Uuid, dto: BankDto) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    aggregate.update(&dto);

    // Валидация
    aggregate.validate().map_err(ApiError::BadRequest)?;

    // Before write
    aggregate.before_write();

    repository::update(db, &aggregate).await
}

/// Мягкое удаление банка. Значения пользовательских полей удаляются сразу,
/// чтобы они не попали к другой записи.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<()> {
    let txn = db.begin().await?;
    if !repository::soft_delete(&txn, id).await? {
        return Err(not_found(id));
    }
    let purged =
        custom_fields::purge_entity(&txn, Bank::custom_fields_entity(), &id.to_string()).await?;
    txn.commit().await?;
    tracing::info!("Bank {} deleted ({} custom field value(s) purged)", id, purged);
    Ok(())
}

/// Получение банка по ID
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<Bank>> {
    repository::get_by_id(db, id).await
}

/// Получение списка всех банков
pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Bank>> {
    repository::list_all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use contracts::shared::custom_fields::FieldValues;

    fn dto(name: &str) -> BankDto {
        BankDto {
            name: name.into(),
            address: "1 Main St".into(),
            account_number: "40702810".into(),
            swift: "DEUTDEFF".into(),
            ..Default::default()
        }
    }

    fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_)))
    }

    #[tokio::test]
    async fn test_create_update_list() {
        let db = test_connection().await;
        let id = create(&db, dto("Zeta Bank")).await.unwrap();
        create(&db, dto("alpha bank")).await.unwrap();

        let bank = get_by_id(&db, id).await.unwrap().unwrap();
        assert!(bank.base.code.starts_with("BNK-"));
        assert_eq!(bank.base.metadata.version, 1);

        let mut changed = BankDto::from(&bank);
        changed.address = "2 Side St".into();
        update(&db, id, changed).await.unwrap();

        let bank = get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(bank.address, "2 Side St");
        assert_eq!(bank.base.metadata.version, 2);

        let names: Vec<String> = list_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.base.description)
            .collect();
        assert_eq!(names, vec!["alpha bank", "Zeta Bank"]);
    }

    #[tokio::test]
    async fn test_invalid_bank_is_rejected() {
        let db = test_connection().await;
        let mut bad = dto("Bank");
        bad.swift = "ABC".into();
        let err = create(&db, bad).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::BadRequest(_))));
        assert!(list_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_bank_is_not_found() {
        let db = test_connection().await;
        let id = Uuid::new_v4();
        assert!(is_not_found(&update(&db, id, dto("X")).await.unwrap_err()));
        assert!(is_not_found(&delete(&db, id).await.unwrap_err()));

        let created = create(&db, dto("Once")).await.unwrap();
        delete(&db, created).await.unwrap();
        assert!(is_not_found(&delete(&db, created).await.unwrap_err()));
        assert!(get_by_id(&db, created).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_bank_does_not_inherit_deleted_values() {
        let db = test_connection().await;
        let old_id = create(&db, dto("Old Bank")).await.unwrap();
        let mut values = FieldValues::new();
        values.insert("branchCode".into(), "B001".into());
        custom_fields::batch_upsert(&db, "bank", &old_id.to_string(), &values)
            .await
            .unwrap();

        delete(&db, old_id).await.unwrap();
        assert!(custom_fields::fetch_values(&db, "bank", &old_id.to_string())
            .await
            .unwrap()
            .is_empty());

        let new_id = create(&db, dto("New Bank")).await.unwrap();
        assert_ne!(new_id, old_id);
        assert!(custom_fields::fetch_values(&db, "bank", &new_id.to_string())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_rolled_back_when_purge_fails() {
        use sea_orm::ConnectionTrait;

        let db = test_connection().await;
        let id = create(&db, dto("Kept Bank")).await.unwrap();
        db.execute_unprepared("DROP TABLE sys_field_value").await.unwrap();

        assert!(delete(&db, id).await.is_err());
        assert!(get_by_id(&db, id).await.unwrap().is_some());
    }
}

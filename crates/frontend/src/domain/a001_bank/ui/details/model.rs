use crate::shared::http::{self, Method};
use contracts::domain::a001_bank::aggregate::{Bank, BankDto};
use contracts::shared::custom_fields::CustomFieldError;
use serde::Deserialize;

#[derive(Deserialize)]
struct CreatedId {
    id: String,
}

pub async fn fetch_all() -> Result<Vec<Bank>, CustomFieldError> {
    http::get_json("/api/banks").await
}

pub async fn fetch_by_id(id: &str) -> Result<Bank, CustomFieldError> {
    http::get_json(&format!("/api/banks/{}", id)).await
}

/// Создать банк, вернуть присвоенный сервером id
pub async fn create(dto: &BankDto) -> Result<String, CustomFieldError> {
    let created: CreatedId = http::send_json(Method::Post, "/api/banks", dto).await?;
    Ok(created.id)
}

pub async fn update(id: &str, dto: &BankDto) -> Result<String, CustomFieldError> {
    let updated: CreatedId = http::send_json(Method::Put, &format!("/api/banks/{}", id), dto).await?;
    Ok(updated.id)
}

pub async fn delete(id: &str) -> Result<(), CustomFieldError> {
    http::send_no_content(Method::Delete, &format!("/api/banks/{}", id)).await
}

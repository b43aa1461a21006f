use axum::http::StatusCode;
use axum::{extract::Path, Json};
use contracts::domain::a001_bank::aggregate::{Bank, BankDto};
use serde_json::json;

use crate::domain::a001_bank;
use crate::shared::api_error::{ApiError, ApiResult};
use crate::shared::data::db::get_connection;

fn parse_id(id: &str) -> ApiResult<uuid::Uuid> {
    uuid::Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid bank id: {}", id)))
}

/// GET /api/banks
pub async fn list_all() -> ApiResult<Json<Vec<Bank>>> {
    Ok(Json(a001_bank::service::list_all(get_connection()).await?))
}

/// GET /api/banks/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Bank>> {
    let uuid = parse_id(&id)?;
    a001_bank::service::get_by_id(get_connection(), uuid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Bank {}", id)))
}

/// POST /api/banks
pub async fn create(Json(dto): Json<BankDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = a001_bank::service::create(get_connection(), dto).await?;
    Ok(Json(json!({ "id": id.to_string() })))
}

/// PUT /api/banks/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<BankDto>,
) -> ApiResult<Json<serde_json::Value>> {
    let uuid = parse_id(&id)?;
    a001_bank::service::update(get_connection(), uuid, dto).await?;
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/banks/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    let uuid = parse_id(&id)?;
    a001_bank::service::delete(get_connection(), uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

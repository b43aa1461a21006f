use axum::http::StatusCode;
use axum::{extract::Path, Json};
use contracts::domain::a002_product::aggregate::{Product, ProductDto};
use serde_json::json;

use crate::domain::a002_product;
use crate::shared::api_error::{ApiError, ApiResult};
use crate::shared::data::db::get_connection;

fn parse_id(id: &str) -> ApiResult<uuid::Uuid> {
    uuid::Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid product id: {}", id)))
}

/// GET /api/products
pub async fn list_all() -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(a002_product::service::list_all(get_connection()).await?))
}

/// GET /api/products/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Product>> {
    let uuid = parse_id(&id)?;
    a002_product::service::get_by_id(get_connection(), uuid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {}", id)))
}

/// POST /api/products
pub async fn create(Json(dto): Json<ProductDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = a002_product::service::create(get_connection(), dto).await?;
    Ok(Json(json!({ "id": id.to_string() })))
}

/// PUT /api/products/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<ProductDto>,
) -> ApiResult<Json<serde_json::Value>> {
    let uuid = parse_id(&id)?;
    a002_product::service::update(get_connection(), uuid, dto).await?;
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/products/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    let uuid = parse_id(&id)?;
    a002_product::service::delete(get_connection(), uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

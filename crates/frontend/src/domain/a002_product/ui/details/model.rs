use crate::shared::http::{self, Method};
use contracts::domain::a002_product::aggregate::{Product, ProductDto};
use contracts::shared::custom_fields::CustomFieldError;
use serde::Deserialize;

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

pub async fn fetch_all() -> Result<Vec<Product>, CustomFieldError> {
    http::get_json("/api/products").await
}

pub async fn fetch_by_id(id: &str) -> Result<Product, CustomFieldError> {
    http::get_json(&format!("/api/products/{}", id)).await
}

pub async fn create(dto: &ProductDto) -> Result<String, CustomFieldError> {
    let response: IdResponse = http::send_json(Method::Post, "/api/products", dto).await?;
    Ok(response.id)
}

pub async fn update(id: &str, dto: &ProductDto) -> Result<String, CustomFieldError> {
    let response: IdResponse =
        http::send_json(Method::Put, &format!("/api/products/{}", id), dto).await?;
    Ok(response.id)
}

pub async fn delete(id: &str) -> Result<(), CustomFieldError> {
    http::send_no_content(Method::Delete, &format!("/api/products/{}", id)).await
}

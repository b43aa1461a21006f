use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор товара
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,

    pub sku: String,
    pub price: f64,
    pub unit: String,
}

impl Product {
    /// Создать новый товар для вставки в БД
    pub fn new_for_insert(
        code: String,
        name: String,
        sku: String,
        price: f64,
        unit: String,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(ProductId::new_v4(), code, name);
        base.comment = comment;

        Self {
            base,
            sku,
            price,
            unit,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &ProductDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.name.clone();
        self.base.comment = dto.comment.clone();
        self.sku = dto.sku.clone();
        self.price = dto.price;
        self.unit = dto.unit.clone();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Product name must not be empty".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Code must not be empty".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be a non-negative number".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "product"
    }

    fn element_name() -> &'static str {
        "Product"
    }

    fn list_name() -> &'static str {
        "Products"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления товара
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub unit: String,
    pub comment: Option<String>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.to_string_id()),
            code: Some(product.base.code.clone()),
            name: product.base.description.clone(),
            sku: product.sku.clone(),
            price: product.price,
            unit: product.unit.clone(),
            comment: product.base.comment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_is_rejected() {
        let mut product = Product::new_for_insert(
            "PRD-001".into(),
            "Widget".into(),
            "W-1".into(),
            10.0,
            "pcs".into(),
            None,
        );
        assert!(product.validate().is_ok());
        product.price = -1.0;
        assert!(product.validate().is_err());
        product.price = f64::NAN;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_serialized_product_flattens_base() {
        let product = Product::new_for_insert(
            "PRD-002".into(),
            "Gadget".into(),
            "G-2".into(),
            5.5,
            "pcs".into(),
            Some("note".into()),
        );
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["description"], "Gadget");
        assert_eq!(json["code"], "PRD-002");
        assert_eq!(json["price"], 5.5);
    }
}

use super::model;
use crate::shared::custom_fields::save::{partial_save_warning, save_custom_fields, SaveOutcome};
use crate::shared::mount_guard::MountGuard;
use contracts::domain::a002_product::aggregate::{Product, ProductDto};
use contracts::domain::common::AggregateRoot;
use contracts::shared::custom_fields::FieldValues;
use leptos::prelude::*;
use std::rc::Rc;

/// Разобрать цену из поля ввода. Пустая строка - ноль, запятая допускается.
pub fn parse_price(raw: &str) -> Result<f64, String> {
    let raw = raw.trim().replace(',', ".");
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_| "Price must be a number".to_string())
}

/// Проверка формы до отправки
pub fn validate_dto(dto: &ProductDto, price_text: &str) -> Result<ProductDto, String> {
    let mut dto = dto.clone();
    dto.price = parse_price(price_text)?;
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "NEW".to_string());
    Product::new_for_insert(
        code,
        dto.name.clone(),
        dto.sku.clone(),
        dto.price,
        dto.unit.clone(),
        dto.comment.clone(),
    )
    .validate()?;
    Ok(dto)
}

#[derive(Clone)]
pub struct ProductDetailsViewModel {
    pub form: RwSignal<ProductDto>,
    /// Цена в том виде, как её ввёл пользователь
    pub price_text: RwSignal<String>,
    /// План записи пользовательских полей из `DynamicFieldsSection`
    pub custom_values: RwSignal<FieldValues>,
    pub error: RwSignal<Option<String>>,
    pub saving: RwSignal<bool>,
    guard: MountGuard,
}

impl ProductDetailsViewModel {
    pub fn new() -> Self {
        Self {
            form: RwSignal::new(ProductDto::default()),
            price_text: RwSignal::new(String::new()),
            custom_values: RwSignal::new(FieldValues::new()),
            error: RwSignal::new(None),
            saving: RwSignal::new(false),
            guard: MountGuard::new(),
        }
    }

    pub fn is_edit_mode(&self) -> impl Fn() -> bool + '_ {
        move || self.form.with(|f| f.id.is_some())
    }

    pub fn is_form_valid(&self) -> impl Fn() -> bool + '_ {
        move || self.form.with(|f| !f.name.trim().is_empty())
    }

    pub fn load_if_needed(&self, id: Option<String>) {
        let Some(existing_id) = id else {
            return;
        };
        let form = self.form;
        let price_text = self.price_text;
        let error = self.error;
        let guard = self.guard.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = model::fetch_by_id(&existing_id).await;
            guard.run(|| match result {
                Ok(product) => {
                    price_text.set(product.price.to_string());
                    form.set(ProductDto::from(&product));
                }
                Err(e) if e.is_not_found() => {
                    error.set(Some("This product no longer exists".to_string()))
                }
                Err(e) => error.set(Some(format!("Failed to load product: {}", e))),
            });
        });
    }

    /// Двухфазное сохранение: товар, затем его пользовательские поля
    pub fn save_command(&self, on_done: Rc<dyn Fn(SaveOutcome)>) {
        let current = match validate_dto(&self.form.get_untracked(), &self.price_text.get_untracked())
        {
            Ok(dto) => dto,
            Err(e) => {
                self.error.set(Some(e));
                return;
            }
        };

        let planned = self.custom_values.get_untracked();
        let error = self.error;
        let saving = self.saving;
        let guard = self.guard.clone();
        saving.set(true);
        error.set(None);

        wasm_bindgen_futures::spawn_local(async move {
            let saved = match &current.id {
                Some(id) => model::update(id, &current).await,
                None => model::create(&current).await,
            };

            let id = match saved {
                Ok(id) => id,
                Err(e) if e.is_not_found() && current.id.is_some() => {
                    guard.run(|| saving.set(false));
                    on_done(SaveOutcome::Missing(
                        "This product was deleted elsewhere. The list has been refreshed."
                            .to_string(),
                    ));
                    return;
                }
                Err(e) => {
                    guard.run(|| {
                        saving.set(false);
                        error.set(Some(e.to_string()));
                    });
                    return;
                }
            };

            let result = save_custom_fields(Product::custom_fields_entity(), &id, &planned).await;
            let warning = partial_save_warning(&result);
            if let Some(w) = &warning {
                log::warn!("Product {} saved with custom field errors: {}", id, w);
            }
            guard.run(|| saving.set(false));
            on_done(SaveOutcome::Saved { warning });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(""), Ok(0.0));
        assert_eq!(parse_price(" 12,50 "), Ok(12.5));
        assert!(parse_price("twelve").is_err());
    }

    #[test]
    fn test_validate_dto_applies_price() {
        let dto = ProductDto {
            name: "Widget".into(),
            ..Default::default()
        };
        let checked = validate_dto(&dto, "9.99").unwrap();
        assert_eq!(checked.price, 9.99);

        assert!(validate_dto(&dto, "-1").is_err());
        assert!(validate_dto(&ProductDto::default(), "1").is_err());
    }
}

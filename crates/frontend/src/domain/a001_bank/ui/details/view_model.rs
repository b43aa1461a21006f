use super::model;
use crate::shared::custom_fields::save::{partial_save_warning, save_custom_fields, SaveOutcome};
use crate::shared::mount_guard::MountGuard;
use contracts::domain::a001_bank::aggregate::{Bank, BankDto};
use contracts::domain::common::AggregateRoot;
use contracts::shared::custom_fields::FieldValues;
use leptos::prelude::*;
use std::rc::Rc;

/// Проверка формы до отправки. Код может быть пустым: сервер присвоит его сам.
pub fn validate_dto(dto: &BankDto) -> Result<(), String> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "NEW".to_string());
    let bank = Bank::new_for_insert(
        code,
        dto.name.clone(),
        dto.address.clone(),
        dto.account_number.clone(),
        dto.swift.clone(),
        dto.comment.clone(),
    );
    bank.validate()
}

/// ViewModel карточки банка
#[derive(Clone)]
pub struct BankDetailsViewModel {
    pub form: RwSignal<BankDto>,
    /// План записи пользовательских полей из `DynamicFieldsSection`
    pub custom_values: RwSignal<FieldValues>,
    pub error: RwSignal<Option<String>>,
    pub saving: RwSignal<bool>,
    guard: MountGuard,
}

impl BankDetailsViewModel {
    pub fn new() -> Self {
        Self {
            form: RwSignal::new(BankDto::default()),
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

    /// Загрузить банк с сервера, если открыт существующий
    pub fn load_if_needed(&self, id: Option<String>) {
        let Some(existing_id) = id else {
            return;
        };
        let form = self.form;
        let error = self.error;
        let guard = self.guard.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = model::fetch_by_id(&existing_id).await;
            guard.run(|| match result {
                Ok(bank) => form.set(BankDto::from(&bank)),
                Err(e) if e.is_not_found() => {
                    error.set(Some("This bank no longer exists".to_string()))
                }
                Err(e) => error.set(Some(format!("Failed to load bank: {}", e))),
            });
        });
    }

    /// Сохранить банк, затем значения его пользовательских полей.
    ///
    /// Ошибка первой фазы оставляет окно открытым. Ошибка второй фазы не
    /// откатывает банк и возвращается как предупреждение в `SaveOutcome`.
    pub fn save_command(&self, on_done: Rc<dyn Fn(SaveOutcome)>) {
        let current = self.form.get_untracked();
        if let Err(e) = validate_dto(&current) {
            self.error.set(Some(e));
            return;
        }

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
                        "This bank was deleted elsewhere. The list has been refreshed.".to_string(),
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

            let result = save_custom_fields(Bank::custom_fields_entity(), &id, &planned).await;
            let warning = partial_save_warning(&result);
            if let Some(w) = &warning {
                log::warn!("Bank {} saved with custom field errors: {}", id, w);
            }
            guard.run(|| saving.set(false));
            on_done(SaveOutcome::Saved { warning });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str, swift: &str) -> BankDto {
        BankDto {
            name: name.into(),
            swift: swift.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_dto_allows_missing_code() {
        assert!(validate_dto(&dto("First National", "")).is_ok());
        assert!(validate_dto(&dto("First National", "DEUTDEFF")).is_ok());
    }

    #[test]
    fn test_validate_dto_rejects_bad_input() {
        assert_eq!(
            validate_dto(&dto("  ", "")),
            Err("Bank name must not be empty".to_string())
        );
        assert!(validate_dto(&dto("First National", "DEU")).is_err());
    }
}

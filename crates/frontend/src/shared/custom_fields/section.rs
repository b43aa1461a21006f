use super::api;
use super::configurator::FieldConfigurator;
use super::renderer::DynamicFieldRenderer;
use crate::shared::icons::icon;
use crate::shared::modal_stack::ModalStackService;
use crate::shared::mount_guard::MountGuard;
use contracts::shared::custom_fields::{active_columns, FieldDefinition, FieldValues, FieldValuesDraft};
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen_futures::spawn_local;

/// Секция пользовательских полей в форме сущности.
///
/// Определения загружаются при монтировании, значения - когда известен
/// `entity_id` (в режиме создания его нет, значения начинаются пустыми).
/// Сеть на каждое изменение не вызывается: `on_change` получает план записи,
/// а отправляет его вызывающий код после сохранения самой сущности.
///
/// Если `entity_id` задан при монтировании, до загрузки значений план
/// содержит только поля, изменённые пользователем (см. `FieldValuesDraft`).
#[component]
pub fn DynamicFieldsSection(
    entity_type: String,
    #[prop(into)] entity_id: Signal<Option<String>>,
    on_change: Callback<FieldValues>,
) -> impl IntoView {
    let guard = MountGuard::new();
    let modal_stack =
        use_context::<ModalStackService>().expect("ModalStackService not found in context");

    let definitions = RwSignal::new(Vec::<FieldDefinition>::new());
    let draft = RwSignal::new(if entity_id.with_untracked(Option::is_some) {
        FieldValuesDraft::pending()
    } else {
        FieldValuesDraft::fresh()
    });
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal::<Option<String>>(None);

    let emit = move || {
        let planned: FieldValues = definitions.with_untracked(|defs| draft.with_untracked(|d| d.plan(defs)));
        on_change.run(planned);
    };

    let load_definitions = {
        let guard = guard.clone();
        let entity_type = entity_type.clone();
        move || {
            let guard = guard.clone();
            let entity_type = entity_type.clone();
            set_loading.set(true);
            spawn_local(async move {
                let result = api::list_definitions(&entity_type).await;
                guard.run(|| {
                    match result {
                        Ok(all) => {
                            definitions.set(active_columns(&all));
                            set_error.set(None);
                        }
                        Err(e) => {
                            // Без определений форма остаётся рабочей
                            log::warn!("Failed to load custom fields for {}: {}", entity_type, e);
                            definitions.set(Vec::new());
                            set_error.set(Some(format!("Custom fields are unavailable: {}", e)));
                        }
                    }
                    set_loading.set(false);
                    emit();
                });
            });
        }
    };

    load_definitions();

    // Значения подгружаются, когда у сущности появляется ID
    Effect::new({
        let guard = guard.clone();
        let entity_type = entity_type.clone();
        move |_| {
            let Some(id) = entity_id.get() else {
                return;
            };
            let guard = guard.clone();
            let entity_type = entity_type.clone();
            spawn_local(async move {
                let result = api::fetch_values(&entity_type, &id).await;
                guard.run(|| match result {
                    Ok(loaded) => {
                        draft.update(|d| d.apply_loaded(loaded));
                        emit();
                    }
                    Err(e) => {
                        // Черновик остаётся незагруженным: сохранятся только правки
                        log::warn!("Failed to load custom field values for {} {}: {}", entity_type, id, e);
                        set_error.set(Some(format!("Custom field values could not be loaded: {}", e)));
                    }
                });
            });
        }
    });

    let open_configurator = {
        let entity_type = entity_type.clone();
        let reload = load_definitions.clone();
        move |_| {
            let entity_type = entity_type.clone();
            let reload = reload.clone();
            // Перечитать определения после закрытия окна любым способом
            let on_dismiss = Callback::new(move |_| reload());
            modal_stack.push_with_frame(
                Some("max-width: min(960px, 95vw); width: min(960px, 95vw);".to_string()),
                Some("field-configurator-modal".to_string()),
                Some(on_dismiss),
                move |handle| {
                    let on_close = Callback::new(move |_| handle.close());
                    view! { <FieldConfigurator entity_type=entity_type.clone() on_close=on_close /> }
                        .into_any()
                },
            );
        }
    };

    view! {
        <div class="custom-fields">
            <div class="custom-fields__header">
                <h4 class="custom-fields__title">"Custom fields"</h4>
                <Button appearance=ButtonAppearance::Subtle size=ButtonSize::Small on_click=open_configurator>
                    {icon("settings")}
                    " Configure"
                </Button>
            </div>

            {move || error.get().map(|e| view! {
                <MessageBar intent=MessageBarIntent::Warning>{e}</MessageBar>
            })}

            {move || {
                if loading.get() {
                    view! {
                        <Flex gap=FlexGap::Small align=FlexAlign::Center>
                            <Spinner size=SpinnerSize::Small />
                            "Loading fields..."
                        </Flex>
                    }.into_any()
                } else if definitions.with(|d| d.is_empty()) {
                    view! {
                        <div class="custom-fields__placeholder">
                            "No custom fields are configured for this record type yet."
                        </div>
                    }.into_any()
                } else {
                    view! {
                        <div class="custom-fields__grid">
                            <For
                                each=move || definitions.get()
                                key=|d| (d.id.clone(), d.updated_at)
                                children=move |definition| {
                                    let key = definition.field_key.clone();
                                    let value = Signal::derive({
                                        let key = key.clone();
                                        move || draft.with(|d| d.value(&key).unwrap_or_default().to_string())
                                    });
                                    let on_field_change = Callback::new(move |new_value: String| {
                                        draft.update(|d| d.edit(key.clone(), new_value));
                                        emit();
                                    });
                                    view! {
                                        <DynamicFieldRenderer
                                            definition=definition
                                            value=value
                                            on_change=on_field_change
                                        />
                                    }
                                }
                            />
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}

use crate::shared::components::ui::{Checkbox, Input, Select, Textarea};
use contracts::shared::custom_fields::{FieldDefinition, FieldInput};
use leptos::prelude::*;

/// Элемент управления для одного пользовательского поля.
///
/// Вид элемента выбирается один раз по типу поля (неизвестный тип уже
/// приведён к TEXT при разборе). Текущее значение и подсказка "Required"
/// пересчитываются из `value`; подсказка не блокирует сохранение.
/// Наружу уходит строковое представление через `on_change`.
#[component]
pub fn DynamicFieldRenderer(
    definition: FieldDefinition,
    #[prop(into)] value: Signal<String>,
    on_change: Callback<String>,
) -> impl IntoView {
    let control_id = format!("custom-field-{}", definition.field_key);
    let label = definition.field_name.clone();
    let required = definition.required;

    let current = {
        let definition = definition.clone();
        move || FieldInput::from_definition(&definition, Some(&value.get()))
    };
    let hint = {
        let current = current.clone();
        Signal::derive(move || current().hint(required).map(|h| h.message()))
    };
    let emit = {
        let current = current.clone();
        move |raw: String| {
            let mut input = current();
            input.apply(&raw);
            on_change.run(input.serialize());
        }
    };

    match FieldInput::from_definition(&definition, None) {
        FieldInput::Boolean(_) => {
            let checked = {
                let current = current.clone();
                Signal::derive(move || matches!(current(), FieldInput::Boolean(true)))
            };
            let on_toggle = Callback::new(move |checked: bool| {
                let mut input = current();
                input.set_checked(checked);
                on_change.run(input.serialize());
            });
            view! {
                <div class="form__group custom-field custom-field--boolean">
                    <Checkbox id=control_id label=label checked=checked on_change=on_toggle />
                    {move || hint.get().map(|h| view! { <div class="form__hint form__hint--warning">{h}</div> })}
                </div>
            }
            .into_any()
        }
        FieldInput::Select { options, .. } => {
            let empty = options.is_empty();
            let choices: Vec<(String, String)> =
                options.into_iter().map(|o| (o.clone(), o)).collect();
            let placeholder = if empty { "No options configured" } else { "Select..." };
            view! {
                <Select
                    id=control_id
                    label=label
                    required=required
                    value=value
                    options=choices
                    placeholder=placeholder.to_string()
                    disabled=empty
                    hint=hint
                    on_change=Callback::new(emit)
                />
            }
            .into_any()
        }
        FieldInput::Textarea(_) => view! {
            <Textarea
                id=control_id
                label=label
                required=required
                value=value
                hint=hint
                on_input=Callback::new(emit)
            />
        }
        .into_any(),
        other => {
            let input_type = other.html_input_type().unwrap_or("text").to_string();
            view! {
                <Input
                    id=control_id
                    label=label
                    required=required
                    input_type=input_type
                    value=value
                    hint=hint
                    on_input=Callback::new(emit)
                />
            }
            .into_any()
        }
    }
}

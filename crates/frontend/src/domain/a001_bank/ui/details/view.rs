use super::view_model::BankDetailsViewModel;
use crate::shared::components::ui::{Input, Textarea};
use crate::shared::custom_fields::save::SaveOutcome;
use crate::shared::custom_fields::DynamicFieldsSection;
use crate::shared::icons::icon;
use contracts::domain::a001_bank::aggregate::Bank;
use contracts::domain::common::AggregateRoot;
use leptos::prelude::*;
use std::rc::Rc;

#[component]
pub fn BankDetails(
    id: Option<String>,
    on_done: Rc<dyn Fn(SaveOutcome)>,
    on_cancel: Rc<dyn Fn(())>,
) -> impl IntoView {
    let vm = BankDetailsViewModel::new();
    // ID известен сразу: секция полей ждёт сохранённые значения
    let existing_id = id.clone();
    vm.load_if_needed(id);

    let form = vm.form;
    let custom_values = vm.custom_values;
    let vm_clone = vm.clone();

    view! {
        <div class="details-container bank-details">
            <div class="details-header">
                <h3>
                    {
                        let vm = vm_clone.clone();
                        move || if vm.is_edit_mode()() { "Edit bank" } else { "New bank" }
                    }
                </h3>
            </div>

            {move || vm.error.get().map(|e| view! { <div class="error">{e}</div> })}

            <div class="details-form">
                <Input
                    id="name"
                    label="Name"
                    required=true
                    value=Signal::derive(move || form.with(|f| f.name.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.name = v))
                    placeholder="Bank name"
                />
                <Input
                    id="code"
                    label="Code"
                    value=Signal::derive(move || form.with(|f| f.code.clone().unwrap_or_default()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.code = Some(v)))
                    placeholder="Assigned automatically when empty"
                />
                <Input
                    id="address"
                    label="Address"
                    value=Signal::derive(move || form.with(|f| f.address.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.address = v))
                />
                <Input
                    id="account_number"
                    label="Account number"
                    value=Signal::derive(move || form.with(|f| f.account_number.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.account_number = v))
                />
                <Input
                    id="swift"
                    label="SWIFT"
                    value=Signal::derive(move || form.with(|f| f.swift.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.swift = v))
                    placeholder="8 or 11 characters"
                />
                <Textarea
                    id="comment"
                    label="Comment"
                    rows=3
                    value=Signal::derive(move || form.with(|f| f.comment.clone().unwrap_or_default()))
                    on_input=Callback::new(move |v: String| {
                        form.update(|f| f.comment = if v.is_empty() { None } else { Some(v) });
                    })
                />
            </div>

            <DynamicFieldsSection
                entity_type=Bank::custom_fields_entity().to_string()
                entity_id=Signal::derive(move || existing_id.clone())
                on_change=Callback::new(move |values| custom_values.set(values))
            />

            <div class="details-actions">
                <button
                    class="button button--primary"
                    on:click={
                        let vm = vm_clone.clone();
                        let on_done = on_done.clone();
                        move |_| vm.save_command(on_done.clone())
                    }
                    disabled={
                        let vm = vm_clone.clone();
                        move || vm.saving.get() || !vm.is_form_valid()()
                    }
                >
                    {icon("save")}
                    {
                        let vm = vm_clone.clone();
                        move || if vm.is_edit_mode()() { " Save" } else { " Create" }
                    }
                </button>
                <button class="button button--secondary" on:click=move |_| (on_cancel)(())>
                    {icon("cancel")}
                    " Cancel"
                </button>
            </div>
        </div>
    }
}

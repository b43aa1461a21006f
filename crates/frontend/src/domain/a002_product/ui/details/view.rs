use super::view_model::ProductDetailsViewModel;
use crate::shared::components::ui::{Input, Textarea};
use crate::shared::custom_fields::save::SaveOutcome;
use crate::shared::custom_fields::DynamicFieldsSection;
use crate::shared::icons::icon;
use contracts::domain::a002_product::aggregate::Product;
use contracts::domain::common::AggregateRoot;
use leptos::prelude::*;
use std::rc::Rc;

#[component]
pub fn ProductDetails(
    id: Option<String>,
    on_done: Rc<dyn Fn(SaveOutcome)>,
    on_cancel: Rc<dyn Fn(())>,
) -> impl IntoView {
    let vm = ProductDetailsViewModel::new();
    // ID известен сразу: секция полей ждёт сохранённые значения
    let existing_id = id.clone();
    vm.load_if_needed(id);

    let form = vm.form;
    let price_text = vm.price_text;
    let custom_values = vm.custom_values;
    let error = vm.error;
    let vm_clone = vm.clone();

    view! {
        <div class="details-container product-details">
            <div class="details-header">
                <h3>
                    {
                        let vm = vm_clone.clone();
                        move || if vm.is_edit_mode()() { "Edit product" } else { "New product" }
                    }
                </h3>
            </div>

            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

            <div class="details-form">
                <Input
                    id="name"
                    label="Name"
                    required=true
                    value=Signal::derive(move || form.with(|f| f.name.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.name = v))
                />
                <Input
                    id="code"
                    label="Code"
                    value=Signal::derive(move || form.with(|f| f.code.clone().unwrap_or_default()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.code = Some(v)))
                    placeholder="Assigned automatically when empty"
                />
                <Input
                    id="sku"
                    label="SKU"
                    value=Signal::derive(move || form.with(|f| f.sku.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.sku = v))
                />
                <Input
                    id="price"
                    label="Price"
                    input_type="number"
                    value=price_text
                    on_input=Callback::new(move |v: String| price_text.set(v))
                    placeholder="0.00"
                />
                <Input
                    id="unit"
                    label="Unit"
                    value=Signal::derive(move || form.with(|f| f.unit.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.unit = v))
                    placeholder="pcs"
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
                entity_type=Product::custom_fields_entity().to_string()
                entity_id=Signal::derive(move || existing_id.clone())
                on_change=Callback::new(move |values| custom_values.set(values))
            />

            <div class="details-actions">
                <button
                    class="button button--primary"
                    on:click={
                        let vm = vm_clone.clone();
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

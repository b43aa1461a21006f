use crate::domain::a002_product::ui::details::{self, ProductDetails};
use crate::shared::components::table_checkbox::TableCheckbox;
use crate::shared::custom_fields::api as fields_api;
use crate::shared::custom_fields::save::SaveOutcome;
use crate::shared::icons::icon;
use crate::shared::modal_stack::ModalStackService;
use crate::shared::mount_guard::MountGuard;
use contracts::domain::a002_product::aggregate::Product;
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::custom_fields::{
    active_columns, display_cell, EntityFieldValues, FieldDefinition,
};
use leptos::prelude::*;
use std::collections::HashSet;
use std::rc::Rc;
use thaw::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ProductRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub sku: String,
    pub price: String,
    pub unit: String,
    pub custom: Vec<String>,
}

impl ProductRow {
    pub fn build(product: Product, columns: &[FieldDefinition], values: &EntityFieldValues) -> Self {
        let id = product.base.id.as_string();
        let custom = columns
            .iter()
            .map(|def| display_cell(values.get(&id), def))
            .collect();
        Self {
            code: product.base.code,
            name: product.base.description,
            sku: product.sku,
            price: format_price(product.price),
            unit: product.unit,
            custom,
            id,
        }
    }
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

#[component]
#[allow(non_snake_case)]
pub fn ProductList() -> impl IntoView {
    let guard = MountGuard::new();
    let (items, set_items) = signal::<Vec<ProductRow>>(Vec::new());
    let (columns, set_columns) = signal::<Vec<FieldDefinition>>(Vec::new());
    let (loading, set_loading) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);
    let (selected, set_selected) = signal::<HashSet<String>>(HashSet::new());
    let modal_stack =
        use_context::<ModalStackService>().expect("ModalStackService not found in context");

    let fetch = {
        let guard = guard.clone();
        move || {
            let guard = guard.clone();
            set_loading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let entity = Product::custom_fields_entity();
                let columns = fields_api::list_definitions(entity)
                    .await
                    .map(|all| active_columns(&all))
                    .unwrap_or_else(|e| {
                        log::warn!("Failed to load custom field definitions: {}", e);
                        Vec::new()
                    });

                let products = details::fetch_all().await;
                let values = match &products {
                    Ok(list) if !columns.is_empty() => {
                        let ids: Vec<String> = list.iter().map(|p| p.to_string_id()).collect();
                        fields_api::fetch_values_for_entities(entity, &ids)
                            .await
                            .unwrap_or_else(|e| {
                                log::warn!("Failed to load custom field values: {}", e);
                                EntityFieldValues::new()
                            })
                    }
                    _ => EntityFieldValues::new(),
                };

                guard.run(|| {
                    match products {
                        Ok(list) => {
                            set_items.set(
                                list.into_iter()
                                    .map(|p| ProductRow::build(p, &columns, &values))
                                    .collect(),
                            );
                            set_error.set(None);
                        }
                        Err(e) => {
                            set_items.set(Vec::new());
                            set_error.set(Some(format!("Failed to load products: {}", e)));
                        }
                    }
                    set_columns.set(columns);
                    set_selected.set(HashSet::new());
                    set_loading.set(false);
                });
            });
        }
    };

    let open_details_modal = {
        let fetch = fetch.clone();
        move |id: Option<String>| {
            let fetch = fetch.clone();
            modal_stack.clear();
            modal_stack.push_with_frame(
                Some("max-width: min(900px, 95vw); width: min(900px, 95vw);".to_string()),
                Some("product-details-modal".to_string()),
                Some(Callback::new(move |_| fetch())),
                move |handle| {
                    let on_done = Rc::new({
                        let handle = handle.clone();
                        move |outcome: SaveOutcome| {
                            let message = match outcome {
                                SaveOutcome::Saved { warning } => warning,
                                SaveOutcome::Missing(message) => Some(message),
                            };
                            set_notice.set(message);
                            handle.close();
                        }
                    });
                    let on_cancel = Rc::new({
                        let handle = handle.clone();
                        move |_| handle.close()
                    });

                    view! {
                        <ProductDetails id=id.clone() on_done=on_done on_cancel=on_cancel />
                    }
                    .into_any()
                },
            );
        }
    };

    let toggle_select = move |id: String, checked: bool| {
        set_selected.update(|s| {
            if checked {
                s.insert(id);
            } else {
                s.remove(&id);
            }
        });
    };

    let delete_selected = {
        let guard = guard.clone();
        let fetch = fetch.clone();
        move || {
            let ids: Vec<String> = selected.get_untracked().into_iter().collect();
            if ids.is_empty() {
                return;
            }
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message(&format!("Delete {} selected product(s)?", ids.len()))
                        .ok()
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }

            let guard = guard.clone();
            let fetch = fetch.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let mut failed = 0usize;
                for id in ids {
                    if let Err(e) = details::delete(&id).await {
                        if !e.is_not_found() {
                            log::warn!("Failed to delete product {}: {}", id, e);
                            failed += 1;
                        }
                    }
                }
                guard.run(|| {
                    if failed > 0 {
                        set_error.set(Some(format!("{} product(s) could not be deleted", failed)));
                    }
                    fetch();
                });
            });
        }
    };

    fetch();

    let open_new = open_details_modal.clone();
    let open_existing = open_details_modal.clone();
    let refresh = fetch.clone();

    view! {
        <div class="page">
            <div class="header">
                <div class="header__content">
                    <h1 class="header__title">{icon("products")}" Products"</h1>
                </div>
                <div class="header__actions">
                    <button class="button button--primary" on:click=move |_| open_new(None)>
                        {icon("plus")}
                        " New product"
                    </button>
                    <button class="button button--secondary" on:click=move |_| refresh()>
                        {icon("refresh")}
                        " Refresh"
                    </button>
                    <button
                        class="button button--secondary"
                        on:click=move |_| delete_selected()
                        disabled=move || selected.get().is_empty()
                    >
                        {icon("delete")}
                        {move || format!(" Delete ({})", selected.get().len())}
                    </button>
                </div>
            </div>

            {move || error.get().map(|e| view! {
                <MessageBar intent=MessageBarIntent::Error>{e}</MessageBar>
            })}
            {move || notice.get().map(|n| view! {
                <MessageBar intent=MessageBarIntent::Warning>{n}</MessageBar>
            })}

            <div class="table">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            <th class="table__header-cell table__header-cell--checkbox">
                                <input
                                    type="checkbox"
                                    class="table__checkbox"
                                    on:change=move |ev| {
                                        if event_target_checked(&ev) {
                                            let all = items.with(|rows| rows.iter().map(|r| r.id.clone()).collect());
                                            set_selected.set(all);
                                        } else {
                                            set_selected.set(HashSet::new());
                                        }
                                    }
                                />
                            </th>
                            <th class="table__header-cell">"Code"</th>
                            <th class="table__header-cell">"Name"</th>
                            <th class="table__header-cell">"SKU"</th>
                            <th class="table__header-cell table__header-cell--number">"Price"</th>
                            <th class="table__header-cell">"Unit"</th>
                            {move || columns.get().into_iter().map(|def| view! {
                                <th class="table__header-cell table__header-cell--custom">{def.field_name}</th>
                            }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            if loading.get() && items.with(|rows| rows.is_empty()) {
                                return view! {
                                    <tr><td class="table__cell" colspan="100">"Loading..."</td></tr>
                                }.into_any();
                            }
                            let open_existing = open_existing.clone();
                            items.get().into_iter().map(move |row| {
                                let id_for_click = row.id.clone();
                                let id_for_checkbox = row.id.clone();
                                let id_for_toggle = row.id.clone();
                                let is_selected = selected.with(|s| s.contains(&row.id));
                                let open_existing = open_existing.clone();
                                view! {
                                    <tr
                                        class="table__row"
                                        class:table__row--selected=is_selected
                                        on:click=move |_| open_existing(Some(id_for_click.clone()))
                                    >
                                        <TableCheckbox
                                            checked=Signal::derive(move || selected.with(|s| s.contains(&id_for_checkbox)))
                                            on_change=Callback::new(move |checked| toggle_select(id_for_toggle.clone(), checked))
                                        />
                                        <td class="table__cell">{row.code}</td>
                                        <td class="table__cell">{row.name}</td>
                                        <td class="table__cell">{row.sku}</td>
                                        <td class="table__cell table__cell--number">{row.price}</td>
                                        <td class="table__cell">{row.unit}</td>
                                        {row.custom.into_iter().map(|cell| view! {
                                            <td class="table__cell">{cell}</td>
                                        }).collect_view()}
                                    </tr>
                                }
                            }).collect_view().into_any()
                        }}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::custom_fields::{FieldType, FieldValues};

    #[test]
    fn test_row_formats_price_and_boolean_cells() {
        let product = Product::new_for_insert(
            "PRD-1".into(),
            "Widget".into(),
            "W-01".into(),
            12.5,
            "pcs".into(),
            None,
        );
        let id = product.to_string_id();
        let now = chrono::Utc::now();
        let columns = vec![FieldDefinition {
            id: "def-1".into(),
            entity_type: "product".into(),
            field_key: "fragile".into(),
            field_name: "Fragile".into(),
            field_type: FieldType::Boolean,
            options_json: None,
            required: false,
            active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }];
        let mut values = EntityFieldValues::new();
        values.insert(id, FieldValues::from([("fragile".to_string(), "true".to_string())]));

        let row = ProductRow::build(product, &columns, &values);
        assert_eq!(row.price, "12.50");
        assert_eq!(row.custom, vec!["Yes".to_string()]);
    }
}

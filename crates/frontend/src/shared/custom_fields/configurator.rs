use super::api;
use crate::shared::components::ui::{Checkbox, Input, Select, Textarea};
use crate::shared::icons::icon;
use crate::shared::mount_guard::MountGuard;
use contracts::shared::custom_fields::{
    options_json_to_text, options_text_to_json, validate_options, CustomFieldError,
    FieldDefinition, FieldDefinitionDto, FieldDefinitionPatch, FieldType,
};
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen_futures::spawn_local;

/// Состояние формы создания/редактирования определения
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguratorForm {
    /// `None` - создание нового поля
    pub editing_id: Option<String>,
    /// Показывается только для чтения при редактировании
    pub field_key: String,
    pub field_name: String,
    pub field_type: FieldType,
    /// Варианты SELECT: по одному на строку или через запятую
    pub options_text: String,
    pub required: bool,
    pub sort_order: String,
}

impl Default for ConfiguratorForm {
    fn default() -> Self {
        Self {
            editing_id: None,
            field_key: String::new(),
            field_name: String::new(),
            field_type: FieldType::Text,
            options_text: String::new(),
            required: false,
            sort_order: "0".to_string(),
        }
    }
}

impl ConfiguratorForm {
    pub fn from_definition(def: &FieldDefinition) -> Self {
        Self {
            editing_id: Some(def.id.clone()),
            field_key: def.field_key.clone(),
            field_name: def.field_name.clone(),
            field_type: def.field_type,
            options_text: options_json_to_text(def.options_json.as_deref()),
            required: def.required,
            sort_order: def.sort_order.to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    fn options_json(&self) -> Option<String> {
        self.field_type
            .has_options()
            .then(|| options_text_to_json(&self.options_text))
    }

    fn sort_order(&self) -> Result<i32, CustomFieldError> {
        let raw = self.sort_order.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| CustomFieldError::Validation("Sort order must be a whole number".into()))
    }

    /// Локальная проверка до отправки запроса
    pub fn validate(&self) -> Result<(), CustomFieldError> {
        if self.field_name.trim().is_empty() {
            return Err(CustomFieldError::Validation("Field name is required".into()));
        }
        if let Some(options_json) = self.options_json() {
            validate_options(&options_json)?;
        }
        self.sort_order()?;
        Ok(())
    }

    pub fn to_dto(&self, entity_type: &str) -> Result<FieldDefinitionDto, CustomFieldError> {
        self.validate()?;
        Ok(FieldDefinitionDto {
            entity_type: entity_type.to_string(),
            field_key: None,
            field_name: self.field_name.trim().to_string(),
            field_type: self.field_type.as_str().to_string(),
            options_json: self.options_json(),
            required: self.required,
            sort_order: Some(self.sort_order()?),
        })
    }

    pub fn to_patch(&self) -> Result<FieldDefinitionPatch, CustomFieldError> {
        self.validate()?;
        Ok(FieldDefinitionPatch {
            field_name: Some(self.field_name.trim().to_string()),
            field_type: Some(self.field_type.as_str().to_string()),
            options_json: Some(self.options_json().unwrap_or_default()),
            required: Some(self.required),
            active: None,
            sort_order: Some(self.sort_order()?),
        })
    }
}

/// Окно администрирования полей одного типа сущности: список всех
/// определений (активных и неактивных), форма создания и правки,
/// деактивация, повторная активация и удаление.
#[component]
pub fn FieldConfigurator(entity_type: String, on_close: Callback<()>) -> impl IntoView {
    let guard = MountGuard::new();
    let definitions = RwSignal::new(Vec::<FieldDefinition>::new());
    let form = RwSignal::new(ConfiguratorForm::default());
    let (loading, set_loading) = signal(true);
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);

    let reload = {
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
                        Ok(mut all) => {
                            all.sort_by_key(|d| (!d.active, d.sort_order));
                            definitions.set(all);
                        }
                        Err(e) => {
                            log::warn!("Failed to load field definitions: {}", e);
                            definitions.set(Vec::new());
                            set_error.set(Some(e.to_string()));
                        }
                    }
                    set_loading.set(false);
                });
            });
        }
    };
    reload();

    // Общая обработка ответа на изменение: 404 обновляет список и сообщает
    // пользователю, остальные ошибки показываются в окне
    let handle_result = {
        let reload = reload.clone();
        move |result: Result<(), CustomFieldError>, done: &str| {
            set_busy.set(false);
            match result {
                Ok(()) => {
                    set_error.set(None);
                    set_notice.set(Some(done.to_string()));
                    form.set(ConfiguratorForm::default());
                    reload();
                }
                Err(e) if e.is_not_found() => {
                    set_error.set(None);
                    set_notice.set(Some(
                        "This field no longer exists. The list has been refreshed.".to_string(),
                    ));
                    form.set(ConfiguratorForm::default());
                    reload();
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
        }
    };

    let submit = {
        let guard = guard.clone();
        let entity_type = entity_type.clone();
        let handle_result = handle_result.clone();
        move |_| {
            let current = form.get_untracked();
            set_notice.set(None);
            if let Err(e) = current.validate() {
                set_error.set(Some(e.to_string()));
                return;
            }
            set_busy.set(true);
            let guard = guard.clone();
            let entity_type = entity_type.clone();
            let handle_result = handle_result.clone();
            spawn_local(async move {
                let result = match &current.editing_id {
                    Some(id) => match current.to_patch() {
                        Ok(patch) => api::update_definition(id, &patch).await.map(|_| ()),
                        Err(e) => Err(e),
                    },
                    None => match current.to_dto(&entity_type) {
                        Ok(dto) => api::create_definition(&dto).await.map(|_| ()),
                        Err(e) => Err(e),
                    },
                };
                let done = if current.is_edit() { "Field updated" } else { "Field created" };
                guard.run(|| handle_result(result, done));
            });
        }
    };

    let set_active = {
        let guard = guard.clone();
        let handle_result = handle_result.clone();
        move |id: String, active: bool| {
            set_busy.set(true);
            set_notice.set(None);
            let guard = guard.clone();
            let handle_result = handle_result.clone();
            spawn_local(async move {
                let result = if active {
                    api::activate_definition(&id).await.map(|_| ())
                } else {
                    api::deactivate_definition(&id).await.map(|_| ())
                };
                let done = if active { "Field activated" } else { "Field deactivated" };
                guard.run(|| handle_result(result, done));
            });
        }
    };

    let remove = {
        let guard = guard.clone();
        let handle_result = handle_result.clone();
        move |def: FieldDefinition| {
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message(&format!(
                        "Delete field \"{}\"? Values stored for it will be deleted too.",
                        def.field_name
                    ))
                    .ok()
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }
            set_busy.set(true);
            set_notice.set(None);
            let guard = guard.clone();
            let handle_result = handle_result.clone();
            spawn_local(async move {
                // Повторное удаление уже удалённого поля считается успехом
                let result = match api::delete_definition(&def.id).await {
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other,
                };
                guard.run(|| handle_result(result, "Field deleted"));
            });
        }
    };

    let type_options: Vec<(String, String)> = FieldType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), t.label().to_string()))
        .collect();

    view! {
        <div class="details-container field-configurator">
            <div class="details-header">
                <h3>{format!("Custom fields: {}", entity_type)}</h3>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| on_close.run(())>
                    {icon("cancel")}
                    " Close"
                </Button>
            </div>

            {move || error.get().map(|e| view! {
                <MessageBar intent=MessageBarIntent::Error>{e}</MessageBar>
            })}
            {move || notice.get().map(|n| view! {
                <MessageBar intent=MessageBarIntent::Info>{n}</MessageBar>
            })}

            <Table>
                <TableHeader>
                    <TableRow>
                        <TableHeaderCell>"Name"</TableHeaderCell>
                        <TableHeaderCell>"Key"</TableHeaderCell>
                        <TableHeaderCell>"Type"</TableHeaderCell>
                        <TableHeaderCell attr:style="width: 90px;">"Required"</TableHeaderCell>
                        <TableHeaderCell attr:style="width: 90px;">"Status"</TableHeaderCell>
                        <TableHeaderCell attr:style="width: 220px;">"Actions"</TableHeaderCell>
                    </TableRow>
                </TableHeader>
                <TableBody>
                    {
                        let set_active = set_active.clone();
                        let remove = remove.clone();
                        move || {
                            if loading.get() {
                                return view! {
                                    <TableRow>
                                        <TableCell attr:colspan="6">
                                            <Flex gap=FlexGap::Small align=FlexAlign::Center>
                                                <Spinner size=SpinnerSize::Small />
                                                "Loading..."
                                            </Flex>
                                        </TableCell>
                                    </TableRow>
                                }.into_any();
                            }
                            let items = definitions.get();
                            if items.is_empty() {
                                return view! {
                                    <TableRow>
                                        <TableCell attr:colspan="6">"No fields defined yet"</TableCell>
                                    </TableRow>
                                }.into_any();
                            }
                            items.into_iter().map(|def| {
                                let for_edit = def.clone();
                                let for_remove = def.clone();
                                let id = def.id.clone();
                                let active = def.active;
                                let set_active = set_active.clone();
                                let remove = remove.clone();
                                view! {
                                    <TableRow class:table__row--inactive=!active>
                                        <TableCell>{def.field_name.clone()}</TableCell>
                                        <TableCell><code>{def.field_key.clone()}</code></TableCell>
                                        <TableCell>{def.field_type.label()}</TableCell>
                                        <TableCell>{if def.required { "Yes" } else { "No" }}</TableCell>
                                        <TableCell>
                                            {if active {
                                                view! { <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Success>"Active"</Badge> }.into_any()
                                            } else {
                                                view! { <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Subtle>"Inactive"</Badge> }.into_any()
                                            }}
                                        </TableCell>
                                        <TableCell>
                                            <Space>
                                                <Button
                                                    appearance=ButtonAppearance::Transparent
                                                    size=ButtonSize::Small
                                                    disabled=busy
                                                    on_click=move |_| form.set(ConfiguratorForm::from_definition(&for_edit))
                                                >
                                                    {icon("edit")}
                                                </Button>
                                                <Button
                                                    appearance=ButtonAppearance::Subtle
                                                    size=ButtonSize::Small
                                                    disabled=busy
                                                    on_click=move |_| set_active(id.clone(), !active)
                                                >
                                                    {if active { "Deactivate" } else { "Activate" }}
                                                </Button>
                                                <Button
                                                    appearance=ButtonAppearance::Transparent
                                                    size=ButtonSize::Small
                                                    disabled=busy
                                                    on_click=move |_| remove(for_remove.clone())
                                                >
                                                    {icon("delete")}
                                                </Button>
                                            </Space>
                                        </TableCell>
                                    </TableRow>
                                }
                            }).collect_view().into_any()
                        }
                    }
                </TableBody>
            </Table>

            <div class="details-form field-configurator__form">
                <h4>{move || if form.with(|f| f.is_edit()) { "Edit field" } else { "New field" }}</h4>

                <Input
                    id="field-name"
                    label="Field name"
                    required=true
                    value=Signal::derive(move || form.with(|f| f.field_name.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.field_name = v))
                    placeholder="e.g. Tax Id"
                />

                {move || form.with(|f| f.is_edit()).then(|| view! {
                    <div class="form__group">
                        <label class="form__label">"Key"</label>
                        <code>{move || form.with(|f| f.field_key.clone())}</code>
                    </div>
                })}

                <Select
                    id="field-type"
                    label="Type"
                    value=Signal::derive(move || form.with(|f| f.field_type.as_str().to_string()))
                    options=type_options
                    on_change=Callback::new(move |v: String| {
                        form.update(|f| f.field_type = FieldType::parse_lenient(&v));
                    })
                />

                <Show when=move || form.with(|f| f.field_type.has_options())>
                    <Textarea
                        id="field-options"
                        label="Options (one per line)"
                        required=true
                        rows=4
                        value=Signal::derive(move || form.with(|f| f.options_text.clone()))
                        on_input=Callback::new(move |v: String| form.update(|f| f.options_text = v))
                        placeholder="Low\nMedium\nHigh"
                    />
                </Show>

                <Input
                    id="field-sort-order"
                    label="Sort order"
                    input_type="number"
                    value=Signal::derive(move || form.with(|f| f.sort_order.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.sort_order = v))
                />

                <Checkbox
                    id="field-required"
                    label="Required (shows a hint, does not block saving)"
                    checked=Signal::derive(move || form.with(|f| f.required))
                    on_change=Callback::new(move |v: bool| form.update(|f| f.required = v))
                />
            </div>

            <div class="details-actions">
                <Button appearance=ButtonAppearance::Primary disabled=busy on_click=submit>
                    {icon("save")}
                    {move || if form.with(|f| f.is_edit()) { " Save field" } else { " Add field" }}
                </Button>
                <Show when=move || form.with(|f| f.is_edit())>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| form.set(ConfiguratorForm::default())
                    >
                        " New field"
                    </Button>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, field_type: FieldType, options: &str) -> ConfiguratorForm {
        ConfiguratorForm {
            field_name: name.into(),
            field_type,
            options_text: options.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_happens_before_request() {
        assert!(form("", FieldType::Text, "").validate().is_err());
        assert!(form("Risk Tier", FieldType::Select, "").validate().is_err());

        let err = form("Risk Tier", FieldType::Select, "Low\nlow").validate().unwrap_err();
        assert_eq!(err, CustomFieldError::Validation("Duplicate option: low".into()));

        let mut bad_order = form("Tax Id", FieldType::Text, "");
        bad_order.sort_order = "first".into();
        assert!(bad_order.validate().is_err());
    }

    #[test]
    fn test_to_dto_serializes_options_only_for_select() {
        let dto = form("Size", FieldType::Select, "Large, heavy\nSmall\n")
            .to_dto("product")
            .unwrap();
        assert_eq!(dto.field_type, "SELECT");
        assert_eq!(dto.options_json.as_deref(), Some(r#"["Large, heavy","Small"]"#));
        assert_eq!(dto.field_key, None);

        let dto = form("Tax Id", FieldType::Text, "ignored").to_dto("bank").unwrap();
        assert_eq!(dto.options_json, None);
        assert_eq!(dto.sort_order, Some(0));
    }

    #[test]
    fn test_edit_round_trip_keeps_options_text() {
        let now = chrono::Utc::now();
        let def = FieldDefinition {
            id: "1".into(),
            entity_type: "bank".into(),
            field_key: "riskTier".into(),
            field_name: "Risk Tier".into(),
            field_type: FieldType::Select,
            options_json: Some(r#"["Low","High"]"#.into()),
            required: true,
            active: true,
            sort_order: 2,
            created_at: now,
            updated_at: now,
        };
        let edit = ConfiguratorForm::from_definition(&def);
        assert!(edit.is_edit());
        assert_eq!(edit.options_text, "Low\nHigh");

        let patch = edit.to_patch().unwrap();
        assert_eq!(patch.options_json.as_deref(), Some(r#"["Low","High"]"#));
        assert_eq!(patch.sort_order, Some(2));
        assert_eq!(patch.active, None);
    }
}

//! Пользовательские поля сущностей (dynamic custom fields)
//!
//! - `definition` - схема поля, которую настраивает администратор
//! - `value` - сохранённые значения по (entity_type, entity_id, field_key)
//! - `input` - контракт рендеринга по типу поля
//! - `layout` - колонки таблиц и план сохранения

pub mod definition;
pub mod error;
pub mod field_type;
pub mod input;
pub mod layout;
pub mod value;

pub use definition::{
    derive_field_key, options_json_to_text, options_text_to_json, parse_options,
    validate_options, FieldDefinition, FieldDefinitionDto, FieldDefinitionPatch,
};
pub use error::CustomFieldError;
pub use field_type::FieldType;
pub use input::{FieldHint, FieldInput};
pub use layout::{active_columns, display_cell, plan_upserts, FieldValuesDraft, EMPTY_CELL};
pub use value::{
    BatchUpsertReport, EntityFieldValues, FieldValue, FieldValues, UpsertFieldValueRequest,
    UpsertOutcome,
};

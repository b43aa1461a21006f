pub mod api_error;
pub mod config;
pub mod custom_fields;
pub mod data;

//! Пользовательские поля: клиент хранилищ, рендеринг и настройка

pub mod api;
pub mod configurator;
pub mod renderer;
pub mod save;
pub mod section;

pub use renderer::DynamicFieldRenderer;
pub use section::DynamicFieldsSection;

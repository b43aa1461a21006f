//! Общие контракты frontend/backend: агрегаты, DTO и логика
//! пользовательских полей, не зависящая от платформы.

pub mod domain;
pub mod shared;

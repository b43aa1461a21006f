//! Хранилища определений и значений пользовательских полей

pub mod definition_repository;
pub mod service;
pub mod value_repository;

//! Общие типы и трейты агрегатов

pub mod aggregate_id;
pub mod aggregate_root;
pub mod base_aggregate;

pub use aggregate_id::AggregateId;
pub use aggregate_root::AggregateRoot;
pub use base_aggregate::{code_or_generated, BaseAggregate, EntityMetadata};

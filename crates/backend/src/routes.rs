use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // CUSTOM FIELDS
        // ========================================
        .route(
            "/api/fields",
            get(handlers::custom_fields::list_definitions)
                .post(handlers::custom_fields::create_definition),
        )
        .route(
            "/api/fields/:id",
            get(handlers::custom_fields::get_definition)
                .put(handlers::custom_fields::update_definition)
                .delete(handlers::custom_fields::delete_definition),
        )
        .route(
            "/api/fields/:id/deactivate",
            post(handlers::custom_fields::deactivate_definition),
        )
        .route(
            "/api/fields/:id/activate",
            post(handlers::custom_fields::activate_definition),
        )
        .route(
            "/api/field-values",
            get(handlers::custom_fields::fetch_values).put(handlers::custom_fields::upsert_value),
        )
        .route(
            "/api/field-values/batch",
            post(handlers::custom_fields::batch_upsert),
        )
        .route(
            "/api/field-values/by-entities",
            get(handlers::custom_fields::fetch_values_for_entities),
        )
        // ========================================
        // AGGREGATES
        // ========================================
        // A001 Bank handlers
        .route(
            "/api/banks",
            get(handlers::a001_bank::list_all).post(handlers::a001_bank::create),
        )
        .route(
            "/api/banks/:id",
            get(handlers::a001_bank::get_by_id)
                .put(handlers::a001_bank::update)
                .delete(handlers::a001_bank::delete),
        )
        // A002 Product handlers
        .route(
            "/api/products",
            get(handlers::a002_product::list_all).post(handlers::a002_product::create),
        )
        .route(
            "/api/products/:id",
            get(handlers::a002_product::get_by_id)
                .put(handlers::a002_product::update)
                .delete(handlers::a002_product::delete),
        )
}

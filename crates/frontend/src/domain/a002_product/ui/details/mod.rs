//! Карточка товара: model.rs (API), view_model.rs (состояние), view.rs (UI)

mod model;
mod view;
mod view_model;

pub use model::{delete, fetch_all};
pub use view::ProductDetails;
pub use view_model::ProductDetailsViewModel;

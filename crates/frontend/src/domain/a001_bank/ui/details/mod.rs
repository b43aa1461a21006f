//! Карточка банка (MVVM):
//! - model.rs: вызовы API
//! - view_model.rs: состояние формы и двухфазное сохранение
//! - view.rs: компонент Leptos

mod model;
mod view;
mod view_model;

pub use model::{delete, fetch_all};
pub use view::BankDetails;
pub use view_model::BankDetailsViewModel;

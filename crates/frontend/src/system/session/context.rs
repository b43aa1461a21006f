use super::storage;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

/// Пользователь, представившийся на странице входа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl SessionUser {
    /// Имя для шапки: display_name или часть email до '@'
    pub fn label(&self) -> String {
        let name = self.display_name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        self.email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Текущая сессия. Создаётся один раз в корне приложения и читается
/// компонентами через `use_session`, localStorage повторно не опрашивается.
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub user: RwSignal<Option<SessionUser>>,
}

impl SessionContext {
    /// Восстановить сессию из localStorage
    pub fn restore() -> Self {
        let user = storage::load_user();
        if let Some(u) = &user {
            log::info!("Session restored for {}", u.email);
        }
        Self {
            user: RwSignal::new(user),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.with(|u| u.is_some())
    }

    pub fn sign_in(&self, user: SessionUser) {
        storage::save_user(&user);
        self.user.set(Some(user));
    }

    pub fn sign_out(&self) {
        storage::clear_user();
        self.user.set(None);
    }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionContext not found in component tree")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_email() {
        let user = SessionUser {
            email: "ops@example.com".into(),
            display_name: " ".into(),
        };
        assert_eq!(user.label(), "ops");

        let user = SessionUser {
            email: "ops@example.com".into(),
            display_name: "Operations".into(),
        };
        assert_eq!(user.label(), "Operations");
    }
}

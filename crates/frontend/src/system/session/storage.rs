use super::context::SessionUser;
use web_sys::window;

const SESSION_USER_KEY: &str = "session_user";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Сохранить текущего пользователя в localStorage
pub fn save_user(user: &SessionUser) {
    let Some(storage) = get_local_storage() else {
        return;
    };
    match serde_json::to_string(user) {
        Ok(json) => {
            let _ = storage.set_item(SESSION_USER_KEY, &json);
        }
        Err(e) => log::warn!("Failed to serialize session user: {}", e),
    }
}

/// Прочитать пользователя. Повреждённая запись игнорируется.
pub fn load_user() -> Option<SessionUser> {
    let raw = get_local_storage()?.get_item(SESSION_USER_KEY).ok()??;
    serde_json::from_str(&raw)
        .map_err(|e| log::warn!("Ignoring malformed session entry: {}", e))
        .ok()
}

pub fn clear_user() {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(SESSION_USER_KEY);
    }
}

//! Адрес backend API
//!
//! Backend всегда слушает порт 3000 на том же хосте, что и страница.

/// Базовый URL API, например "http://localhost:3000".
/// Пустая строка, если `window` недоступен.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:3000", protocol, hostname)
}

/// Полный URL по пути вида "/api/banks"
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

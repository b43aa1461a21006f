//! HTTP-клиент поверх `fetch` с таймаутом и разбором ошибок
//!
//! Каждый запрос отменяется через `AbortController`, если ответ не пришёл
//! за [`REQUEST_TIMEOUT_MS`]. Не-2xx ответы превращаются в
//! [`CustomFieldError`] по статусу и телу `{"message": ...}`.

use crate::shared::api_utils::api_url;
use contracts::shared::custom_fields::CustomFieldError;
use gloo_timers::callback::Timeout;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

/// Клиентский таймаут запроса
pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Путь с query-строкой: `with_query("/api/fields", &q)` -> "/api/fields?entity=bank"
pub fn with_query<Q: Serialize>(path: &str, query: &Q) -> Result<String, CustomFieldError> {
    let qs = serde_qs::to_string(query)
        .map_err(|e| CustomFieldError::Validation(format!("Invalid query: {}", e)))?;
    if qs.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, qs))
    }
}

fn js_error(e: JsValue) -> CustomFieldError {
    // Отмена по таймауту приходит как DOMException с именем AbortError
    if let Some(dom) = e.dyn_ref::<web_sys::DomException>() {
        if dom.name() == "AbortError" {
            return CustomFieldError::Transient(format!(
                "Request timed out after {} s",
                REQUEST_TIMEOUT_MS / 1000
            ));
        }
        return CustomFieldError::Transient(dom.message());
    }
    CustomFieldError::Transient(format!("{e:?}"))
}

/// Выполнить запрос и вернуть тело ответа как текст
pub async fn request(
    method: Method,
    path: &str,
    body: Option<String>,
) -> Result<String, CustomFieldError> {
    let controller = AbortController::new().map_err(js_error)?;

    let opts = RequestInit::new();
    opts.set_method(method.as_str());
    opts.set_mode(RequestMode::Cors);
    opts.set_signal(Some(&controller.signal()));
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }

    let url = api_url(path);
    let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(js_error)?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }

    let window = web_sys::window()
        .ok_or_else(|| CustomFieldError::Transient("no window".to_string()))?;

    // Таймер снимается при выходе из функции (drop)
    let _timeout = Timeout::new(REQUEST_TIMEOUT_MS, move || controller.abort());

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;

    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();

    if !resp.ok() {
        let err = CustomFieldError::from_status(resp.status(), &text);
        log::warn!("{} {} failed: {}", method.as_str(), path, err);
        return Err(err);
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CustomFieldError> {
    serde_json::from_str(text)
        .map_err(|e| CustomFieldError::Transient(format!("Invalid response: {}", e)))
}

fn encode<B: Serialize>(body: &B) -> Result<String, CustomFieldError> {
    serde_json::to_string(body)
        .map_err(|e| CustomFieldError::Validation(format!("Cannot encode request: {}", e)))
}

pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, CustomFieldError> {
    let text = request(Method::Get, path, None).await?;
    decode(&text)
}

/// Запрос с JSON-телом и JSON-ответом
pub async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, CustomFieldError> {
    let text = request(method, path, Some(encode(body)?)).await?;
    decode(&text)
}

/// Запрос без тела, но с JSON-ответом (например, POST-действие над записью)
pub async fn send_for_json<T: DeserializeOwned>(method: Method, path: &str) -> Result<T, CustomFieldError> {
    let text = request(method, path, None).await?;
    decode(&text)
}

/// Запрос без тела ответа (DELETE, 204 No Content)
pub async fn send_no_content(method: Method, path: &str) -> Result<(), CustomFieldError> {
    request(method, path, None).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Query<'a> {
        entity: &'a str,
        #[serde(rename = "entityId")]
        entity_id: &'a str,
    }

    #[test]
    fn test_with_query_renames_and_encodes() {
        let path = with_query(
            "/api/field-values",
            &Query {
                entity: "bank",
                entity_id: "a b",
            },
        )
        .unwrap();
        assert!(path.starts_with("/api/field-values?"));
        assert!(path.contains("entity=bank"));
        assert!(path.contains("entityId=a+b") || path.contains("entityId=a%20b"));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}

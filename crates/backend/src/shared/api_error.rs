use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::custom_fields::CustomFieldError;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Ошибка HTTP-обработчика. Тело ответа: `{"error": ..., "message": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CustomFieldError> for ApiError {
    fn from(e: CustomFieldError) -> Self {
        match e {
            CustomFieldError::Validation(msg) => ApiError::BadRequest(msg),
            CustomFieldError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        // Ошибки домена приходят из сервисов завёрнутыми в anyhow
        let e = match e.downcast::<ApiError>() {
            Ok(api) => return api,
            Err(e) => e,
        };
        match e.downcast::<CustomFieldError>() {
            Ok(domain) => domain.into(),
            Err(e) => match e.downcast::<DbErr>() {
                Ok(db) => ApiError::Database(db),
                Err(e) => ApiError::Internal(e.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Error"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = json!({
            "error": error,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        let resp = ApiError::from(CustomFieldError::Validation("Field name is required".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::from(CustomFieldError::NotFound("Field definition x".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_anyhow_wrapped_domain_error_is_unwrapped() {
        let err = anyhow::Error::new(CustomFieldError::Validation("bad".into()));
        assert!(matches!(ApiError::from(err), ApiError::BadRequest(m) if m == "bad"));

        let err: anyhow::Error = ApiError::NotFound("Bank 1".into()).into();
        assert!(matches!(ApiError::from(err), ApiError::NotFound(m) if m == "Bank 1"));

        let err = anyhow::anyhow!("boom");
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }
}

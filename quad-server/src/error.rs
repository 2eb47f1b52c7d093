//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quad_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Validation(_)) | Self::Store(StoreError::InvalidRequest { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::UniqueConstraintViolation { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::Redis(_)) | Self::Store(StoreError::Other { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {self}");
        }

        let body = match &self {
            ApiError::Store(StoreError::Validation(validation)) => json!({
                "error": "validation failed",
                "issues": validation
                    .issues
                    .iter()
                    .map(|issue| json!({
                        "field": issue.field,
                        "code": issue.code,
                        "message": issue.message,
                    }))
                    .collect::<Vec<_>>(),
            }),
            ApiError::Store(StoreError::UniqueConstraintViolation { field, value, .. }) => json!({
                "error": format!("{field} '{value}' is already taken"),
            }),
            // Internal details stay out of responses.
            ApiError::Store(StoreError::Redis(_)) | ApiError::Store(StoreError::Other { .. }) => json!({
                "error": "internal error",
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

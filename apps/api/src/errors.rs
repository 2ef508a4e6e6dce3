use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::storage::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM unavailable: no API key configured")]
    LlmUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LlmUnavailable | AppError::Llm(LlmError::MissingApiKey) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::LlmUnavailable | AppError::Llm(LlmError::MissingApiKey) => (
                "LLM_UNAVAILABLE",
                "Generation requires OPENAI_API_KEY to be set".to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                ("LLM_ERROR", "The language model request failed".to_string())
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                ("STORAGE_ERROR", "A storage error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::LlmUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Llm(LlmError::MissingApiKey).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Llm(LlmError::EmptyContent).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = AppError::Validation("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

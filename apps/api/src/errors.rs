use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Extraction failures are NOT represented here: an unsupported or
/// undecodable upload is recovered inside the extract handler as empty text
/// plus a warning, so the user falls back to manual entry instead of seeing
/// an HTTP error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => error_body(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                json!({ "message": msg }),
            ),
            AppError::MissingFields(fields) => error_body(
                StatusCode::BAD_REQUEST,
                "MISSING_FIELDS",
                json!({
                    "message": format!(
                        "Please complete the following required fields: {}",
                        fields.join(", ")
                    ),
                    "fields": fields,
                }),
            ),
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                error_body(
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    json!({
                        "message": e.to_string(),
                        "hint": e.kind().hint(),
                    }),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    json!({ "message": msg }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    json!({ "message": "An internal server error occurred" }),
                )
            }
        }
    }
}

fn error_body(status: StatusCode, code: &str, mut detail: serde_json::Value) -> Response {
    let obj = detail.as_object_mut().expect("detail is an object");
    obj.insert("code".to_string(), json!(code));
    (status, Json(json!({ "error": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_fields() {
        let err = AppError::MissingFields(vec!["name", "email", "job title"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: name, email, job title"
        );
    }

    #[test]
    fn test_generation_error_carries_provider_detail() {
        let err = AppError::Generation(LlmError::Api {
            status: 429,
            message: "rate limit".to_string(),
        });
        assert!(err.to_string().contains("rate limit"));
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::json::ExtractionFailed;
use crate::llm_client::GatewayError;

/// When set, 500-class responses carry the underlying failure detail instead
/// of a generic message. Controlled by `DEBUG_ERRORS` and set once at startup.
static DEBUG_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn set_debug_errors(enabled: bool) {
    DEBUG_ERRORS.store(enabled, Ordering::Relaxed);
}

fn debug_errors() -> bool {
    DEBUG_ERRORS.load(Ordering::Relaxed)
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionFailed),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    detail_or(format!("{e}"), "A database error occurred"),
                )
            }
            AppError::Gateway(e) => {
                tracing::error!("LLM gateway error: {e}");
                let code = match e {
                    GatewayError::Unavailable => "GATEWAY_UNAVAILABLE",
                    GatewayError::CallFailed { .. } => "GATEWAY_CALL_FAILED",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    detail_or(format!("{e}"), "An AI processing error occurred"),
                )
            }
            AppError::Extraction(e) => {
                tracing::error!("JSON extraction failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    detail_or(format!("{e}"), "An AI processing error occurred"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    detail_or(format!("{e}"), "An internal server error occurred"),
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

fn detail_or(detail: String, generic: &str) -> String {
    if debug_errors() {
        detail
    } else {
        generic.to_string()
    }
}

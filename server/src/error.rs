//! Unified error handling for the server.
//!
//! The gateway splits failures into two layers. Handler-level errors
//! (missing id or payload, unknown action, record not found, a failed
//! batch step) are part of the API contract: they serialize as a
//! structured `{error, sheet?}` body with HTTP 200, and callers detect
//! them by inspecting the body. Transport-level failures (a payload
//! that cannot be decoded, a bad query string, a rejected secret) are
//! real HTTP errors and never reach a handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A handler-level error: structured body, HTTP 200.
    #[error("{source}")]
    Gateway {
        source: gridgate_engine::Error,
        sheet: Option<String>,
    },

    /// The `data` parameter or request body could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Attach the target sheet to an engine error.
    pub fn gateway(source: gridgate_engine::Error, sheet: impl Into<String>) -> Self {
        AppError::Gateway {
            source,
            sheet: Some(sheet.into()),
        }
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sheet: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, sheet) = match self {
            AppError::Gateway { source, sheet } => {
                tracing::debug!("Gateway error: {}", source);
                (StatusCode::OK, source.to_string(), sheet)
            }
            AppError::MalformedPayload(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            sheet,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

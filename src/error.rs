use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ground not found")]
    GroundNotFound,

    #[error("Sport not offered: {0}")]
    SportNotFound(String),

    #[error("Invalid operating-hours range: {0}")]
    InvalidRange(String),

    #[error("Invalid time slot: {0}")]
    InvalidSlot(String),

    #[error("No time slots selected")]
    EmptySelection,

    #[error("Slot no longer available: {0}")]
    SlotConflict(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid payment notification signature")]
    InvalidSignature,

    #[error("Cancellation window passed: {0}")]
    CancellationWindowPassed(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("External service error: {0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred".to_string())
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::GroundNotFound => (StatusCode::NOT_FOUND, "Ground not found".to_string()),
            AppError::SportNotFound(ref name) => (
                StatusCode::NOT_FOUND,
                format!("Sport not offered at this ground: {}", name),
            ),
            AppError::InvalidRange(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidSlot(ref msg) => (
                StatusCode::BAD_REQUEST,
                format!("Requested slot is outside operating hours: {}", msg),
            ),
            AppError::EmptySelection => (
                StatusCode::BAD_REQUEST,
                "At least one time slot must be selected".to_string(),
            ),
            AppError::SlotConflict(ref slots) => (
                StatusCode::CONFLICT,
                format!("Slot just taken, please pick another: {}", slots),
            ),
            AppError::InvalidTransition(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidSignature => {
                // Sole authentication for the payment callback channel;
                // mismatches are security-relevant.
                tracing::warn!("Payment notification rejected: signature mismatch");
                (StatusCode::BAD_REQUEST, "Invalid request".to_string())
            }
            AppError::CancellationWindowPassed(ref msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(ref msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::ServiceUnavailable(ref msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::External(ref msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// A record failed its field-level invariants. Always reported before any
/// write is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("time frame must be 2 or 6, got {0}")]
    InvalidTimeFrame(i32),

    #[error("risk multiplier must be between 1.0 and 2.0, got {0}")]
    RiskMultiplierOutOfRange(Decimal),

    #[error("discount amount must be greater than zero, got {0}")]
    NonPositiveDiscount(Decimal),

    #[error("discount requires an explanation")]
    MissingDiscountExplanation,

    #[error("employee {0} is assigned more than once")]
    DuplicateEmployee(i64),

    #[error("{0} must not be empty")]
    Blank(&'static str),

    #[error("{0} is not a valid e-mail address")]
    InvalidEmail(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{0} must have at most 2 decimal places")]
    TooPrecise(&'static str),

    #[error("{0} must be less than {1}")]
    TooLarge(&'static str, Decimal),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Document storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Converts a store error, naming the missing record when it is `NotFound`.
    pub fn from_store(err: StoreError, what: impl FnOnce() -> String) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(format!("{} not found", what())),
            other => other.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Record not found".to_string()),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(msg) => AppError::Unavailable(msg),
            StoreError::Invalid(msg) => AppError::Validation(msg),
            StoreError::Corrupt(msg) => AppError::Internal(anyhow::anyhow!("corrupt row: {msg}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {msg}");
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "The request conflicts with existing records".to_string(),
                )
            }
            AppError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UNAVAILABLE",
                    "The database is currently unavailable".to_string(),
                )
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Storage(msg) => {
                tracing::error!("Document storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
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

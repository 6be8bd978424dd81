//! Error handling for the back-office API
//!
//! Every failure leaves the server as `{"error": {"code", "message", "field?"}}`
//! with a status derived from the variant.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use config::ConfigError;
use serde::{Deserialize, Serialize};
use shared::{ExportError, LedgerViolation};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range input
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// Well-formed request refused by a business rule
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lost a race with another writer; safe to retry
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Postgres SQLSTATEs for serialization failure and deadlock
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record".to_string()),
            sqlx::Error::PoolTimedOut => {
                AppError::Unavailable("timed out waiting for a database connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                AppError::Unavailable("database pool is closed".to_string())
            }
            sqlx::Error::Io(e) => AppError::Unavailable(format!("database connection failed: {}", e)),
            sqlx::Error::Database(db_err)
                if db_err
                    .code()
                    .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref())) =>
            {
                AppError::Conflict(format!(
                    "concurrent update detected, retry the request ({})",
                    db_err.message()
                ))
            }
            other => AppError::Database(other),
        }
    }
}

impl From<LedgerViolation> for AppError {
    fn from(violation: LedgerViolation) -> Self {
        match violation {
            LedgerViolation::ZeroDelta
            | LedgerViolation::NegativeTarget(_)
            | LedgerViolation::TooPrecise(_)
            | LedgerViolation::OutOfRange(_) => {
                AppError::validation("quantity", violation.to_string())
            }
            LedgerViolation::WouldGoNegative { .. } => AppError::InvalidState(violation.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Internal(format!("failed to render report: {}", err))
    }
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, field) = match &self {
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::InvalidState(msg)
            | AppError::Conflict(msg)
            | AppError::Unavailable(msg) => (msg.clone(), None),
            // Store internals stay in the log
            AppError::Database(_) => ("A database error occurred".to_string(), None),
            AppError::Configuration(_) | AppError::Internal(_) => {
                ("An internal server error occurred".to_string(), None)
            }
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Error: {:?}", self);
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_ledger_violations_map_to_client_errors() {
        let err: AppError = LedgerViolation::ZeroDelta.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));

        let err: AppError = LedgerViolation::WouldGoNegative {
            current: Decimal::from(3),
            change: Decimal::from(-5),
        }
        .into();
        assert_eq!(err.code(), "INVALID_STATE");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = LedgerViolation::OutOfRange(Decimal::MAX).into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        let err: AppError = LedgerViolation::TooPrecise(Decimal::new(4, 4)).into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn test_config_errors_are_configuration() {
        let err: AppError = ConfigError::Message("missing database.url".to_string()).into();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_sqlx_errors_are_internal() {
        let err: AppError = sqlx::Error::ColumnNotFound("quantity".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}

//! Error handling module
//!
//! Application-level error type and its HTTP response conversion. Domain
//! errors flow through unchanged and are mapped to status codes by class;
//! nothing here is fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors keep their own messages
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid national id or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Access credentials already registered for {0}")]
    DuplicateCredentials(String),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn domain_error_code(err: &DomainError) -> (&'static str, StatusCode) {
    match err {
        DomainError::InvalidAmount(_) => ("invalid_amount", StatusCode::BAD_REQUEST),
        DomainError::InsufficientFunds { .. } => ("insufficient_funds", StatusCode::BAD_REQUEST),
        DomainError::WithdrawalLimitExceeded { .. } => {
            ("withdrawal_limit_exceeded", StatusCode::BAD_REQUEST)
        }
        DomainError::WithdrawalCountExceeded { .. } => {
            ("withdrawal_count_exceeded", StatusCode::BAD_REQUEST)
        }
        DomainError::InvalidLoanTerms(_) => ("invalid_loan_terms", StatusCode::BAD_REQUEST),
        DomainError::NoActiveLoan => ("no_active_loan", StatusCode::BAD_REQUEST),
        DomainError::AllInstallmentsPaid => ("all_installments_paid", StatusCode::BAD_REQUEST),
        DomainError::NotLoggedIn => ("not_logged_in", StatusCode::UNAUTHORIZED),
        DomainError::CustomerNotFound(_) => ("customer_not_found", StatusCode::NOT_FOUND),
        DomainError::AccountNotFound(_) => ("account_not_found", StatusCode::NOT_FOUND),
        DomainError::NoAccount => ("no_account", StatusCode::NOT_FOUND),
        DomainError::DuplicateNationalId(_) => ("duplicate_national_id", StatusCode::CONFLICT),
        DomainError::LastAccount => ("last_account", StatusCode::CONFLICT),
        DomainError::NonZeroBalance { .. } => ("nonzero_balance", StatusCode::CONFLICT),
        DomainError::OutstandingLoan { .. } => ("outstanding_loan", StatusCode::CONFLICT),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::Domain(err) => {
                let (code, status) = domain_error_code(err);
                (status, code, Some(err.to_string()))
            }

            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => (
                StatusCode::BAD_REQUEST,
                "missing_header",
                Some(header.clone()),
            ),

            // 401 Unauthorized
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
            }
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),

            // 409 Conflict
            AppError::DuplicateCredentials(id) => (
                StatusCode::CONFLICT,
                "duplicate_credentials",
                Some(id.clone()),
            ),

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use diesel::result::Error as DieselError;
use serde::Serialize;
use std::error::Error as StdError;
use thiserror::Error;

use crate::logging::CustomerEvent;
use crate::persistence::{DomainError, StoreError};

pub type AppResult<T> = Result<T, AppError>;

/// Centralized application error type; every handler failure ends up here and
/// is rendered as `{statusCode, error, message}`.
#[derive(Debug, Error)]
pub enum AppError {
    // Validation errors
    #[error("payload validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    // Resource errors
    #[error("Could not find a customer with id: {0}")]
    CustomerNotFound(i64),

    #[error("{0}")]
    RouteNotFound(String),

    // Storage errors. Domain errors reach this enum unmapped only when no
    // handler in the chain claimed them.
    #[error(transparent)]
    Domain(DomainError),

    #[error("database error")]
    Database(#[source] DieselError),

    #[error("connection pool error: {0}")]
    Pool(String),
}

/// `message` is a list for validation failures and a single string otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Standard JSON error response structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    error: &'static str,
    message: ErrorMessage,
}

impl AppError {
    /// Determines the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client errors
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,

            // 5xx Server errors
            AppError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Determines if error details should be exposed to the client
    /// In production (release builds), we hide internal error details
    fn should_expose_details(&self) -> bool {
        cfg!(debug_assertions) || self.status_code().is_client_error()
    }

    /// Gets the user-facing error message
    fn user_message(&self) -> ErrorMessage {
        if let AppError::Validation(messages) = self {
            return ErrorMessage::Many(messages.clone());
        }

        if self.should_expose_details() {
            let detail = match self {
                AppError::Database(err) => format!("database error: {err}"),
                other => other.to_string(),
            };
            return ErrorMessage::One(detail);
        }

        // For internal errors in production, return a generic message
        let generic = match self {
            AppError::Pool(_) => "service temporarily unavailable",
            _ => "Internal server error",
        };
        ErrorMessage::One(generic.to_string())
    }

    /// Logs the error with appropriate context
    /// This allows internal errors to be logged even when not exposed to clients
    fn log_error(&self) {
        match self.status_code() {
            code if code.is_client_error() => match self {
                AppError::Validation(messages) => {
                    crate::log_customer_event!(
                        CustomerEvent::ValidationRejected,
                        failures = messages.len(),
                        status_code = %code,
                        "Customer payload rejected"
                    );
                }
                AppError::CustomerNotFound(id) => {
                    crate::log_customer_event!(
                        CustomerEvent::NotFound,
                        customer_id = id,
                        status_code = %code,
                        "Customer not found"
                    );
                }
                _ => {
                    tracing::warn!(
                        error = %self,
                        status_code = %code,
                        "Client error"
                    );
                }
            },
            code if code.is_server_error() => {
                tracing::error!(
                    error = %self,
                    status_code = %code,
                    source = ?self.source(),
                    "Server error"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before converting to response
        self.log_error();

        let status = self.status_code();
        let body = Json(ErrorResponse {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown Error"),
            message: self.user_message(),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => AppError::CustomerNotFound(id.into()),
            StoreError::Constraint(domain) => AppError::Domain(domain),
            StoreError::Query(err) => AppError::Database(err),
            StoreError::Pool(message) => AppError::Pool(message),
        }
    }
}

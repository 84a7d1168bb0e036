//! Conversion of storage domain errors into client errors.
//!
//! Each handler owns exactly one [`DomainError`] kind and passes every other
//! error through untouched, so a chain can be assembled in any order.

use crate::errors::{AppError, AppResult};
use crate::logging::CustomerEvent;
use crate::persistence::DomainError;

pub type ErrorHandler = fn(AppError) -> AppError;

/// Create and replace payloads are fully validated, so only uniqueness can
/// fail at the storage boundary.
pub const FULL_WRITE_HANDLERS: &[ErrorHandler] = &[reject_unique_violation];

/// Partial updates can also forward explicit `null`s to storage.
pub const PARTIAL_WRITE_HANDLERS: &[ErrorHandler] =
    &[reject_unique_violation, reject_not_null_violation];

/// Runs the error of `result` through `handlers` in order. Successful results
/// are returned unchanged.
pub fn intercept<T>(result: AppResult<T>, handlers: &[ErrorHandler]) -> AppResult<T> {
    result.map_err(|error| handlers.iter().fold(error, |error, handler| handler(error)))
}

pub fn reject_unique_violation(error: AppError) -> AppError {
    match error {
        AppError::Domain(domain @ DomainError::UniqueViolation { .. }) => bad_request(domain),
        other => other,
    }
}

pub fn reject_not_null_violation(error: AppError) -> AppError {
    match error {
        AppError::Domain(domain @ DomainError::NotNullViolation { .. }) => bad_request(domain),
        other => other,
    }
}

fn bad_request(domain: DomainError) -> AppError {
    crate::log_customer_event!(
        CustomerEvent::ConstraintRejected,
        domain_error = %domain,
        "Storage constraint rejected customer write"
    );
    AppError::BadRequest(domain.to_string())
}

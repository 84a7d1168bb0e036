//! Customer storage on SQLite.
//!
//! Write failures are classified here, once, right after the write call.

pub mod constraint;
pub mod customers;

use diesel::result::Error as DieselError;
use thiserror::Error;

pub use constraint::DomainError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("customer {0} not found")]
    NotFound(i32),
    #[error(transparent)]
    Constraint(#[from] DomainError),
    #[error("database error")]
    Query(#[source] DieselError),
    #[error("connection pool error: {0}")]
    Pool(String),
}

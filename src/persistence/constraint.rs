//! Classification of SQLite constraint failures.
//!
//! The persistence layer reports constraint violations only as message text,
//! for example `UNIQUE constraint failed: customer.email`. Parsing is tied to
//! SQLite's wording and has to be redone for any other engine.

use diesel::result::Error as DieselError;
use serde_json::{Map, Value};
use thiserror::Error;

use super::StoreError;

const UNIQUE_MARKER: &str = "UNIQUE constraint failed: ";
const NOT_NULL_MARKER: &str = "NOT NULL constraint failed: ";

/// Storage-originated failures with client-facing meaning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("There is another {entity} with {field} set to {value}")]
    UniqueViolation {
        entity: String,
        field: String,
        value: String,
    },
    #[error("{field} cannot be null")]
    NotNullViolation { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Unique,
    NotNull,
}

/// The `entity.field` pair named by an engine message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintViolation<'a> {
    pub kind: ViolationKind,
    pub entity: &'a str,
    pub field: &'a str,
}

/// Finds a unique or not-null marker in `text` and the `entity.field` that
/// follows it. Composite constraints report their first column.
pub fn parse_constraint_violation(text: &str) -> Option<ConstraintViolation<'_>> {
    [
        (UNIQUE_MARKER, ViolationKind::Unique),
        (NOT_NULL_MARKER, ViolationKind::NotNull),
    ]
    .into_iter()
    .find_map(|(marker, kind)| {
        let (_, rest) = text.split_once(marker)?;
        let target = rest
            .split(|c: char| c == ',' || c.is_whitespace())
            .next()?;
        let (entity, field) = target.split_once('.')?;

        (!entity.is_empty() && !field.is_empty()).then_some(ConstraintViolation {
            kind,
            entity,
            field,
        })
    })
}

/// Turns a failed write into a [`StoreError`]. Recognised constraint failures
/// become [`StoreError::Constraint`], with the offending value taken from the
/// written `payload`. Anything else is handed back untouched as
/// [`StoreError::Query`].
pub fn translate_write_error(error: DieselError, payload: &Map<String, Value>) -> StoreError {
    let text = error.to_string();
    let Some(violation) = parse_constraint_violation(&text) else {
        return StoreError::Query(error);
    };

    let domain_error = match violation.kind {
        ViolationKind::Unique => DomainError::UniqueViolation {
            entity: violation.entity.to_owned(),
            field: violation.field.to_owned(),
            value: display_value(payload.get(violation.field)),
        },
        ViolationKind::NotNull => DomainError::NotNullViolation {
            field: violation.field.to_owned(),
        },
    };

    tracing::debug!(
        engine_message = %text,
        domain_error = ?domain_error,
        "Classified storage constraint failure"
    );

    StoreError::Constraint(domain_error)
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

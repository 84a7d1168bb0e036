//! Constraint table for customer payloads.

use super::{FieldFormat, FieldKind, FieldRule};

pub const NAME_MAX_LENGTH: usize = 50;
pub const SURNAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Rules for every writable customer field, in declaration order. Messages
/// are reported in this order too.
pub const CUSTOMER_RULES: &[FieldRule] = &[
    FieldRule::required("name", FieldKind::String).max_length(NAME_MAX_LENGTH),
    FieldRule::required("surname", FieldKind::String).max_length(SURNAME_MAX_LENGTH),
    FieldRule::required("email", FieldKind::String)
        .max_length(EMAIL_MAX_LENGTH)
        .format(FieldFormat::Email),
    FieldRule::required("birthdate", FieldKind::Date),
];

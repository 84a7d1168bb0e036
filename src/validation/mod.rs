//! Field-constraint checking for inbound JSON payloads.
//!
//! A payload is checked against a static [`FieldRule`] table. Every field
//! stops at its first broken constraint, and failures come back in the order
//! the rules are declared.

pub mod date;
pub mod email;
pub mod messages;
pub mod schema;

use serde_json::{Map, Value};

/// Raw value shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    #[cfg_attr(not(test), allow(dead_code))]
    Int,
    /// A string holding a calendar-valid `YYYY-MM-DD` date.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Email,
}

/// Declarative rule set for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub max_length: Option<usize>,
    pub format: Option<FieldFormat>,
}

impl FieldRule {
    pub const fn required(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            required: true,
            kind,
            max_length: None,
            format: None,
        }
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub const fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Missing,
    NotString,
    NotInteger,
    Empty,
    TooLong { max: usize },
    InvalidEmail,
    InvalidDate,
}

impl Constraint {
    /// Message used when no customised phrasing exists for this constraint.
    pub fn default_message(&self, field: &str) -> String {
        match self {
            Constraint::Missing => format!("{field} should not be null or undefined"),
            Constraint::NotString => format!("{field} must be a string"),
            Constraint::NotInteger => format!("{field} must be an integer number"),
            Constraint::Empty => format!("{field} should not be empty"),
            Constraint::TooLong { max } => {
                format!("{field} must be shorter than or equal to {max} characters")
            }
            Constraint::InvalidEmail => format!("{field} must be an email"),
            Constraint::InvalidDate => {
                format!("{field} should have a valid date in YYYY-MM-DD format")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: &'static str,
    pub broken: Vec<Constraint>,
}

/// How absent and `null` values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Full payloads (create, replace): required fields must carry a value.
    Required,
    /// Partial payloads (patch): absent and `null` fields are not checked here.
    Partial,
}

/// Checks `payload` against `rules`, returning one failure per broken field
/// in rule order. An empty result means the payload is valid.
pub fn validate(
    payload: &Map<String, Value>,
    rules: &[FieldRule],
    presence: Presence,
) -> Vec<FieldFailure> {
    rules
        .iter()
        .filter_map(|rule| {
            first_broken(rule, payload.get(rule.field), presence).map(|constraint| FieldFailure {
                field: rule.field,
                broken: vec![constraint],
            })
        })
        .collect()
}

fn first_broken(rule: &FieldRule, value: Option<&Value>, presence: Presence) -> Option<Constraint> {
    let value = match value {
        None | Some(Value::Null) => {
            return (rule.required && presence == Presence::Required)
                .then_some(Constraint::Missing);
        }
        Some(value) => value,
    };

    match rule.kind {
        FieldKind::Int => (!is_integer(value)).then_some(Constraint::NotInteger),
        FieldKind::String | FieldKind::Date => match value.as_str() {
            Some(text) => check_text(rule, text),
            None => Some(Constraint::NotString),
        },
    }
}

// Order matters: emptiness, then length, then format, then the date check.
fn check_text(rule: &FieldRule, text: &str) -> Option<Constraint> {
    if rule.required && text.is_empty() {
        return Some(Constraint::Empty);
    }

    if let Some(max) = rule.max_length
        && text.chars().count() > max
    {
        return Some(Constraint::TooLong { max });
    }

    if rule.format == Some(FieldFormat::Email) && !email::is_email(text) {
        return Some(Constraint::InvalidEmail);
    }

    if rule.kind == FieldKind::Date && !date::is_valid_date(text) {
        return Some(Constraint::InvalidDate);
    }

    None
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.is_i64()
                || number.is_u64()
                || number.as_f64().is_some_and(|float| float.fract() == 0.0)
        }
        _ => false,
    }
}

//! Client-facing phrasing for validation failures.

use super::{Constraint, FieldFailure};

/// Renders one message per failure, keeping the failure order. Only the first
/// broken constraint of each field is rendered.
pub fn aggregate(failures: &[FieldFailure]) -> Vec<String> {
    failures
        .iter()
        .filter_map(|failure| {
            failure
                .broken
                .first()
                .map(|constraint| render(failure.field, constraint))
        })
        .collect()
}

pub fn render(field: &str, constraint: &Constraint) -> String {
    match constraint {
        Constraint::Missing => format!("{field} should not be omitted, undefined or null"),
        Constraint::Empty => format!("{field} should not be an empty string"),
        Constraint::NotString => format!("{field} must be a string"),
        Constraint::InvalidEmail => format!("{field} property must contain a valid email"),
        Constraint::InvalidDate => {
            format!("{field} should have a valid date in YYYY-MM-DD format")
        }
        other => other.default_message(field),
    }
}

use std::fmt;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(err) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        tracing::warn!(error = %err, "tracing subscriber already initialised");
    }
}

/// Sanitized wrapper for email addresses that masks the local part
#[derive(Debug, Clone)]
pub struct SanitizedEmail(String);

impl SanitizedEmail {
    pub fn new(email: impl AsRef<str>) -> Self {
        Self(Self::sanitize(email.as_ref()))
    }

    fn sanitize(email: &str) -> String {
        match email.rsplit_once('@') {
            Some((local, domain)) => {
                let length = local.chars().count();
                let masked_local = if length <= 2 {
                    "*".repeat(length)
                } else {
                    let first: String = local.chars().take(1).collect();
                    format!("{first}***")
                };
                format!("{masked_local}@{domain}")
            }
            // Invalid email format, mask entirely
            None => "***@***".to_string(),
        }
    }
}

impl fmt::Display for SanitizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer lifecycle events for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerEvent {
    Created,
    Replaced,
    Updated,
    Deleted,
    ValidationRejected,
    ConstraintRejected,
    NotFound,
}

impl CustomerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerEvent::Created => "customer_created",
            CustomerEvent::Replaced => "customer_replaced",
            CustomerEvent::Updated => "customer_updated",
            CustomerEvent::Deleted => "customer_deleted",
            CustomerEvent::ValidationRejected => "customer_validation_rejected",
            CustomerEvent::ConstraintRejected => "customer_constraint_rejected",
            CustomerEvent::NotFound => "customer_not_found",
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CustomerEvent::ValidationRejected
                | CustomerEvent::ConstraintRejected
                | CustomerEvent::NotFound
        )
    }
}

impl fmt::Display for CustomerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log a customer event; rejections are logged at `warn`.
#[macro_export]
macro_rules! log_customer_event {
    ($event:expr, $($field:tt)*) => {
        if $event.is_rejection() {
            tracing::warn!(
                customer_event = %$event,
                event_type = "customer",
                $($field)*
            );
        } else {
            tracing::info!(
                customer_event = %$event,
                event_type = "customer",
                $($field)*
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_email() {
        assert_eq!(
            SanitizedEmail::new("user@example.com").to_string(),
            "u***@example.com"
        );
        assert_eq!(
            SanitizedEmail::new("ab@test.com").to_string(),
            "**@test.com"
        );
        assert_eq!(SanitizedEmail::new("a@test.com").to_string(), "*@test.com");
        assert_eq!(SanitizedEmail::new("invalid-email").to_string(), "***@***");
    }

    #[test]
    fn test_sanitize_email_with_multibyte_local_part() {
        assert_eq!(
            SanitizedEmail::new("éloïse@example.com").to_string(),
            "é***@example.com"
        );
    }

    #[test]
    fn test_sanitize_quoted_local_part_with_at_sign() {
        assert_eq!(
            SanitizedEmail::new("\"a@b\"@example.com").to_string(),
            "\"***@example.com"
        );
    }

    #[test]
    fn test_rejection_events() {
        assert!(CustomerEvent::ValidationRejected.is_rejection());
        assert!(CustomerEvent::ConstraintRejected.is_rejection());
        assert!(CustomerEvent::NotFound.is_rejection());
        assert!(!CustomerEvent::Created.is_rejection());
        assert!(!CustomerEvent::Deleted.is_rejection());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(CustomerEvent::Created.to_string(), "customer_created");
        assert_eq!(
            CustomerEvent::ConstraintRejected.to_string(),
            "customer_constraint_rejected"
        );
    }
}

use std::sync::LazyLock;

use regex::Regex;

const LOCAL_PART_MAX_LENGTH: usize = 64;

// Dot-atom or quoted local part, then hostname labels ending in an
// alphabetic top-level domain.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|"[\x20\x21\x23-\x5B\x5D-\x7E]*")"#,
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    ))
    .expect("email pattern is valid")
});

/// Returns `true` when `value` has the shape of a deliverable email address.
pub fn is_email(value: &str) -> bool {
    let Some((local, _domain)) = value.rsplit_once('@') else {
        return false;
    };

    local.len() <= LOCAL_PART_MAX_LENGTH && EMAIL_PATTERN.is_match(value)
}

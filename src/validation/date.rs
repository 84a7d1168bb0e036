use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("date pattern is valid")
});

/// Returns `true` when `value` is a fixed-width `YYYY-MM-DD` string naming a
/// real calendar day. Month lengths and leap years are honoured, so
/// `1999-02-29` and `1999-06-31` are rejected.
pub fn is_valid_date(value: &str) -> bool {
    let Some(captures) = DATE_PATTERN.captures(value) else {
        return false;
    };

    let component = |index: usize| {
        captures
            .get(index)
            .and_then(|group| group.as_str().parse::<u32>().ok())
    };

    match (component(1), component(2), component(3)) {
        (Some(year), Some(month), Some(day)) => i32::try_from(year)
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
            .is_some(),
        _ => false,
    }
}

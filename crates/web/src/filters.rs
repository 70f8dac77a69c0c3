//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for app.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Format a timestamp for tables, e.g. `14 Mar 2026 09:30`.
#[must_use]
pub fn format_datetime(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%d %b %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_datetime() {
        let at = chrono::Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
            .single()
            .expect("date");
        assert_eq!(format_datetime(&at), "14 Mar 2026 09:30");
    }
}

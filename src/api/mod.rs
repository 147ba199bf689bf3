pub mod attendance;
pub mod deduction;
pub mod employee;
pub mod ledger;
pub mod loan;
pub mod profile;
pub mod reports;
pub mod stats;
pub mod workplace;

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::AppError;

/// Trimmed text, or `None` when absent or blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date with a four-digit year.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(|| AppError::bad_request(format!("Invalid date {raw:?}, expected YYYY-MM-DD")))
}

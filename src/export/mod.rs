//! Document generation: Word certificate, PDF certificate, Excel timetable.
//!
//! The renderers are pure functions over already-loaded records and byte
//! buffers; all filesystem and storage access stays in the handlers.

pub mod certificate;
pub mod pdf;
pub mod timetable;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::models::ApiError;

/// Placeholder text for an absent feminine-gender field (group).
pub const NOT_SPECIFIED_F: &str = "Не указана";
/// Placeholder text for an absent masculine-gender field (email, phone).
pub const NOT_SPECIFIED_M: &str = "Не указан";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("certificate template could not be parsed: {0}")]
    TemplateParse(String),
    #[error("document packaging failed: {0}")]
    Pack(String),
    #[error("workbook generation failed: {0}")]
    Workbook(String),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::server_error(&err.to_string())
    }
}

/// Dates in generated documents use day.month.year with zero padding.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Study year shown on certificates, derived from the issue date. There is
/// no enrollment date on record, so a fixed two-year offset stands in for
/// it.
pub fn study_year(date: NaiveDate) -> i32 {
    date.year() - 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_formatting_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "07.03.2024");
        assert_eq!(study_year(date), 2022);
    }
}

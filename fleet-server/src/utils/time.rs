//! Clock-time and month-period helpers
//!
//! Clock times travel as `HH:MM` or `HH:MM:SS` strings; months as
//! `(mois, annee)` pairs validated here before reaching the services.

use chrono::{Datelike, NaiveDate, NaiveTime};
use shared::error::ErrorCode;

use super::{AppError, AppResult};

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_clock(value: &str) -> AppResult<NaiveTime> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
        .map_err(|_| AppError::validation(format!("Invalid time format: {value}")))
}

/// Minutes since midnight, seconds ignored
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    use chrono::Timelike;
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Validate a `(mois, annee)` pair and return the month boundaries
pub fn month_bounds(mois: u32, annee: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = shared::util::first_day_of_month(annee, mois);
    let last = shared::util::last_day_of_month(annee, mois);
    match (first, last) {
        (Some(f), Some(l)) => Ok((f, l)),
        _ => Err(AppError::with_message(
            ErrorCode::InvalidPeriod,
            format!("Invalid period {mois:02}/{annee}"),
        )),
    }
}

/// Month containing a date, as `(mois, annee)`
pub fn period_of(date: NaiveDate) -> (u32, i32) {
    (date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accepts_both_formats() {
        assert_eq!(minutes_of_day(parse_clock("08:30").unwrap()), 510);
        assert_eq!(minutes_of_day(parse_clock("22:00:45").unwrap()), 1320);
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("8h").is_err());
    }

    #[test]
    fn month_bounds_rejects_invalid_month() {
        let (first, last) = month_bounds(2, 2024).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(month_bounds(13, 2024).unwrap_err().code, ErrorCode::InvalidPeriod);
        assert!(month_bounds(0, 2024).is_err());
    }
}

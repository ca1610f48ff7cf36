use chrono::{Datelike, NaiveDate};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's date (UTC)
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// First day of a month, `None` when month/year are out of range
pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of a month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// Number of calendar days in a month (0 when the month is invalid)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_day_of_month(year, month).map(|d| d.day()).unwrap_or(0)
}

/// `(year, month)` of the following month
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// `(year, month)` of the preceding month
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// `YYYYMM` period key used in document numbers
pub fn period_key(year: i32, month: u32) -> String {
    format!("{year:04}{month:02}")
}

/// Sequence that follows `last` (a number starting with `prefix`), 1 when there is none
pub fn next_sequence(prefix: &str, last: Option<&str>) -> u32 {
    last.and_then(|n| n.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |seq| seq + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_distinct_enough() {
        let a = snowflake_id();
        let b = snowflake_id();
        assert!(a > 0 && b > 0);
        assert!(a < (1i64 << 53));
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 13), 0);
        assert_eq!(
            last_day_of_month(2025, 4),
            NaiveDate::from_ymd_opt(2025, 4, 30)
        );
    }

    #[test]
    fn month_navigation_wraps_years() {
        assert_eq!(next_month(2025, 12), (2026, 1));
        assert_eq!(previous_month(2025, 1), (2024, 12));
        assert_eq!(next_month(2025, 6), (2025, 7));
    }

    #[test]
    fn period_key_is_zero_padded() {
        assert_eq!(period_key(2025, 3), "202503");
    }

    #[test]
    fn sequence_follows_last_number() {
        assert_eq!(next_sequence("CMD202507", None), 1);
        assert_eq!(next_sequence("CMD202507", Some("CMD2025070002")), 3);
        assert_eq!(next_sequence("FG-202509-", Some("FG-202509-041")), 42);
        assert_eq!(next_sequence("FG-202509-", Some("FG-202509-abc")), 1);
    }
}

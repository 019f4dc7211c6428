use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the weekdays (Monday through Friday) in the inclusive range
/// `start..=end`. Returns 0 when `end` is before `start`. Public holidays
/// are not consulted; only the day of week matters.
pub fn business_days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !is_weekend(*day))
        .count() as i64
}

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns the current UTC time, aligned with the configured timezone.
pub fn now_utc(tz: &Tz) -> DateTime<Utc> {
    now_in_timezone(tz).with_timezone(&Utc)
}

/// Returns the UTC instant at which `date` begins in the given timezone.
///
/// Dates that fall into a DST gap are read as UTC instead of being dropped.
pub fn day_start_utc(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&local),
    }
}

/// Returns the last UTC second of `date` in the given timezone.
pub fn day_end_utc(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let next = date.succ_opt().unwrap_or(date);
    day_start_utc(next, tz) - Duration::seconds(1)
}

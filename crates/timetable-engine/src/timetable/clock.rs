//! Timezone-anchored clock
//!
//! Converts between absolute instants and civil dates in the anchor
//! timezone. The UTC offset used is always the one in effect on the
//! target civil date, so a deadline reads the same wall-clock time in
//! summer and winter.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use shared_types::{AppError, ClockTime};

/// Civil date of `instant` as read in `tz`.
pub fn civil_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Re-stamp `instant` at `time` on its own civil date in `tz`.
pub fn stamp(instant: DateTime<Utc>, time: ClockTime, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    stamp_date(civil_date(instant, tz), time, tz)
}

/// The instant at which `date` shows `time` on a wall clock in `tz`.
pub fn stamp_date(date: NaiveDate, time: ClockTime, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    let clock = NaiveTime::from_hms_opt(time.hour, time.minute, 0).ok_or_else(|| {
        AppError::internal(format!(
            "Invalid clock time {:02}:{:02}",
            time.hour, time.minute
        ))
    })?;

    resolve_local(date.and_time(clock), tz)
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::internal(format!(
                "{} {:02}:{:02} does not exist in {}",
                date,
                time.hour,
                time.minute,
                tz.name()
            ))
        })
}

fn resolve_local(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        // Repeated hour when clocks go back: first occurrence.
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // Skipped hour when clocks go forward: same wall-clock reading after the gap.
        LocalResult::None => tz
            .from_local_datetime(&local.checked_add_signed(Duration::hours(1))?)
            .earliest(),
    }
}

//! Weekday arithmetic on civil dates. Holidays are handled by the resolver.

use chrono::{Datelike, NaiveDate, Weekday};
use shared_types::HolidaySet;

/// Check if a date is a weekend.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A weekday that is not in `holidays`.
pub fn is_business_day(date: NaiveDate, holidays: &HolidaySet) -> bool {
    !is_weekend(date) && !holidays.contains(&date)
}

/// Move `n` weekdays forward (or back, for negative `n`).
///
/// Each counted step lands on a Monday-Friday date, so a Saturday plus one
/// business day is the following Monday. `n == 0` returns `date` unchanged
/// even on a weekend.
pub fn add_business_days(date: NaiveDate, n: i32) -> NaiveDate {
    let mut current = date;
    let mut remaining = n.unsigned_abs();
    while remaining > 0 {
        let next = if n > 0 {
            current.succ_opt()
        } else {
            current.pred_opt()
        };
        let Some(next) = next else {
            return current;
        };
        current = next;
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    current
}

/// `date` itself on a weekday, otherwise the following Monday.
pub fn next_weekday(date: NaiveDate) -> NaiveDate {
    if is_weekend(date) {
        add_business_days(date, 1)
    } else {
        date
    }
}

//! Holiday extension to a fixed point
//!
//! A deadline pushed past one holiday can land on, or stretch across,
//! another. Each pass recounts every holiday in
//! `(range_start, end]` and re-derives `end` from the original candidate
//! by that cumulative count, stopping once a pass discovers nothing new.

use chrono::NaiveDate;
use shared_types::HolidaySet;
use std::ops::Bound::{Excluded, Included};

use super::business_days::{add_business_days, next_weekday};

/// Holidays strictly after `range_start`, up to and including `range_end`.
///
/// The start date is the trigger day and never counts.
pub fn count_holidays(range_start: NaiveDate, range_end: NaiveDate, holidays: &HolidaySet) -> u32 {
    if range_end <= range_start {
        return 0;
    }
    holidays
        .range((Excluded(range_start), Included(range_end)))
        .count() as u32
}

/// Extend `candidate_end` by one business day per holiday in range.
pub fn extend_for_holidays(
    range_start: NaiveDate,
    candidate_end: NaiveDate,
    holidays: &HolidaySet,
) -> NaiveDate {
    extend_for_holidays_counted(range_start, candidate_end, holidays).0
}

/// As [`extend_for_holidays`], also returning how many business days were added.
pub fn extend_for_holidays_counted(
    range_start: NaiveDate,
    candidate_end: NaiveDate,
    holidays: &HolidaySet,
) -> (NaiveDate, u32) {
    let mut applied = 0;
    let mut end = candidate_end;
    loop {
        let total = count_holidays(range_start, end, holidays);
        if total == applied {
            return (end, applied);
        }
        tracing::debug!(
            %range_start,
            %candidate_end,
            previous_end = %end,
            holidays = total,
            "Extending deadline past holidays"
        );
        applied = total;
        end = add_business_days(candidate_end, total as i32);
    }
}

/// The first business day on or after `date`.
pub fn next_business_day(date: NaiveDate, holidays: &HolidaySet) -> NaiveDate {
    let weekday = next_weekday(date);
    // Range covers exactly `weekday` so a holiday on that day is counted.
    let Some(day_before) = weekday.pred_opt() else {
        return weekday;
    };
    extend_for_holidays(day_before, weekday, holidays)
}

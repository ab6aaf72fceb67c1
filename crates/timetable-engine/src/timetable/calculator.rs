//! Timetable calculator and single-date adjuster.

use chrono::{DateTime, NaiveDate, Utc};
use opentelemetry::{trace::Span, KeyValue};
use shared_types::{AppError, ClockTime, ComputedDeadline, HolidaySet, Timetable};
use std::collections::BTreeMap;

use super::business_days::add_business_days;
use super::clock;
use super::holiday_resolver::{extend_for_holidays_counted, next_business_day};
use super::TimetableEngine;
use crate::telemetry::timetable_span;

/// Civil due date for one deadline: `offset` business days after
/// `start_date`, extended past holidays. Returns the date and the number
/// of business days added for holidays.
pub fn compute_due_date(start_date: NaiveDate, offset: u32, holidays: &HolidaySet) -> (NaiveDate, u32) {
    let candidate = add_business_days(start_date, offset as i32);
    extend_for_holidays_counted(start_date, candidate, holidays)
}

impl TimetableEngine {
    /// Compute every deadline for a case.
    ///
    /// `Ok(None)` means no timetable applies yet: the start instant is
    /// unknown, or no policy row matches the case type and procedure. A
    /// holiday feed failure fails the whole calculation.
    #[tracing::instrument(skip(self))]
    pub async fn calculate_timetable(
        &self,
        case_type: &str,
        start: Option<DateTime<Utc>>,
        procedure_type: Option<&str>,
    ) -> Result<Option<Timetable>, AppError> {
        let Some(start) = start else {
            tracing::debug!("No start date, timetable not yet applicable");
            return Ok(None);
        };
        let Some(row) = self.policy.resolve(case_type, procedure_type) else {
            tracing::debug!("No deadline policy row for case");
            return Ok(None);
        };

        let mut span = timetable_span(case_type, row.procedure.as_deref());
        let division = self.division();
        let holidays = match self.holidays.get_holidays(division).await {
            Ok(holidays) => holidays,
            Err(e) => {
                span.set_status(opentelemetry::trace::Status::error(e.message.clone()));
                span.end();
                return Err(e);
            }
        };

        let tz = self.settings.timezone;
        let start_date = clock::civil_date(clock::stamp(start, self.settings.daytime, tz)?, tz);

        let mut deadlines = BTreeMap::new();
        for (name, &offset) in &row.deadlines {
            let (due_date, holidays_skipped) = compute_due_date(start_date, offset, &holidays);
            let due_at = clock::stamp_date(due_date, self.settings.deadline, tz)?;
            deadlines.insert(
                name.clone(),
                ComputedDeadline {
                    name: name.clone(),
                    due_at,
                    business_days: offset,
                    holidays_skipped,
                },
            );
        }

        span.set_attribute(KeyValue::new("timetable.deadlines", deadlines.len() as i64));
        span.end();
        tracing::info!(
            %start_date,
            family = %row.family,
            deadlines = deadlines.len(),
            "Timetable calculated"
        );

        Ok(Some(Timetable {
            case_type: case_type.to_string(),
            procedure_type: row.procedure.clone(),
            division: division.to_string(),
            deadlines,
        }))
    }

    /// Push a single date off weekends and holidays.
    ///
    /// The result is civil midnight, in the anchor timezone, of the first
    /// business day on or after the input's civil date.
    #[tracing::instrument(skip(self))]
    pub async fn next_business_day(&self, date: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        let tz = self.settings.timezone;
        let day = clock::civil_date(clock::stamp(date, self.settings.daytime, tz)?, tz);
        let holidays = self.holidays.get_holidays(self.division()).await?;

        let adjusted = next_business_day(day, &holidays);
        if adjusted != day {
            tracing::debug!(%day, %adjusted, "Date moved to next business day");
        }
        clock::stamp_date(adjusted, ClockTime::midnight(), tz)
    }
}

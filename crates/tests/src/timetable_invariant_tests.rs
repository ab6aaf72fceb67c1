use chrono::{Datelike, Duration, Timelike, Weekday};
use chrono_tz::Europe::London;
use std::collections::BTreeSet;

use crate::common::{date, england_and_wales_holidays, test_engine, utc};

#[tokio::test]
async fn every_deadline_lands_on_a_business_day_at_the_deadline_time() {
    let engine = test_engine();
    let holidays: BTreeSet<_> = england_and_wales_holidays().into_iter().collect();

    let mut start = utc(2024, 1, 1, 12, 0);
    let last = utc(2026, 11, 30, 12, 0);
    while start <= last {
        let tt = engine
            .calculate_timetable("W", Some(start), Some("inquiry"))
            .await
            .unwrap()
            .unwrap();

        for deadline in tt.deadlines.values() {
            let local = deadline.due_at.with_timezone(&London);
            let day = local.date_naive();
            assert!(
                !matches!(day.weekday(), Weekday::Sat | Weekday::Sun),
                "{} from {start} falls on a weekend ({day})",
                deadline.name
            );
            assert!(
                !holidays.contains(&day),
                "{} from {start} falls on a holiday ({day})",
                deadline.name
            );
            assert_eq!((local.hour(), local.minute()), (23, 59));
            assert!(day > start.with_timezone(&London).date_naive());
        }
        start += Duration::days(1);
    }
}

#[tokio::test]
async fn later_start_never_gives_earlier_deadline() {
    let engine = test_engine();
    let mut previous = None;
    let mut start = utc(2025, 11, 1, 12, 0);
    while start <= utc(2026, 1, 31, 12, 0) {
        let due = engine
            .calculate_timetable("D", Some(start), None)
            .await
            .unwrap()
            .and_then(|tt| tt.due_at("lpa_questionnaire_due"))
            .unwrap();
        if let Some(previous) = previous {
            assert!(due >= previous, "deadline moved backwards for start {start}");
        }
        previous = Some(due);
        start += Duration::days(1);
    }
}

#[tokio::test]
async fn adjusted_dates_are_business_days_at_local_midnight() {
    let engine = test_engine();
    let holidays: BTreeSet<_> = england_and_wales_holidays().into_iter().collect();

    let mut day = date(2025, 1, 1);
    while day <= date(2026, 12, 31) {
        let input = day.and_hms_opt(12, 0, 0).unwrap().and_utc();
        let adjusted = engine.next_business_day(input).await.unwrap();
        let local = adjusted.with_timezone(&London);

        assert!(!matches!(local.weekday(), Weekday::Sat | Weekday::Sun));
        assert!(!holidays.contains(&local.date_naive()));
        assert!(local.date_naive() >= day);
        assert_eq!((local.hour(), local.minute()), (0, 0));

        // Already a business day: stays put
        if local.date_naive() == day {
            assert_eq!(engine.next_business_day(adjusted).await.unwrap(), adjusted);
        }
        day = day.succ_opt().unwrap();
    }
}

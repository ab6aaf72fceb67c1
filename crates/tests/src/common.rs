use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use timetable_engine::config::{parse_config, validate_config, LoadedConfig};
use timetable_engine::{HolidayCache, TimetableEngine};

pub const DIVISION: &str = "england-and-wales";

pub const FEED_PATH: &str = "/bank-holidays.json";

/// The deployment config shipped at the workspace root.
pub const TEST_CONFIG: &str = include_str!("../../../config.toml");

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

pub fn test_config() -> LoadedConfig {
    validate_config(&parse_config(TEST_CONFIG).unwrap()).unwrap()
}

/// England and Wales bank holidays, 2024-2026.
pub fn england_and_wales_holidays() -> Vec<NaiveDate> {
    vec![
        date(2024, 1, 1),
        date(2024, 3, 29),
        date(2024, 4, 1),
        date(2024, 5, 6),
        date(2024, 5, 27),
        date(2024, 8, 26),
        date(2024, 12, 25),
        date(2024, 12, 26),
        date(2025, 1, 1),
        date(2025, 4, 18),
        date(2025, 4, 21),
        date(2025, 5, 5),
        date(2025, 5, 26),
        date(2025, 8, 25),
        date(2025, 12, 25),
        date(2025, 12, 26),
        date(2026, 1, 1),
        date(2026, 4, 3),
        date(2026, 4, 6),
        date(2026, 5, 4),
        date(2026, 5, 25),
        date(2026, 8, 31),
        date(2026, 12, 25),
        date(2026, 12, 28),
    ]
}

/// Engine over the shipped policy with a pre-seeded holiday calendar.
pub fn engine_with_holidays(dates: impl IntoIterator<Item = NaiveDate>) -> TimetableEngine {
    let config = test_config();
    let cache = HolidayCache::seeded(DIVISION, dates);
    TimetableEngine::new(config.settings, config.policy, Arc::new(cache))
}

pub fn test_engine() -> TimetableEngine {
    engine_with_holidays(england_and_wales_holidays())
}

/// Engine whose holiday cache fetches from `url`.
pub fn engine_for_feed(url: &str, timeout_secs: u64) -> TimetableEngine {
    let mut config = parse_config(TEST_CONFIG).unwrap();
    config.holiday_feed.url = url.to_string();
    config.holiday_feed.timeout_secs = timeout_secs;
    TimetableEngine::from_config(validate_config(&config).unwrap()).unwrap()
}

/// A holiday feed document in the published format, including fields the
/// engine ignores.
pub fn feed_body(dates: &[NaiveDate]) -> Value {
    let events: Vec<Value> = dates
        .iter()
        .map(|d| {
            json!({
                "title": "Bank holiday",
                "date": d.to_string(),
                "notes": "",
                "bunting": true
            })
        })
        .collect();
    json!({
        "england-and-wales": { "division": "england-and-wales", "events": events },
        "scotland": {
            "division": "scotland",
            "events": [{ "title": "2nd January", "date": "2025-01-02", "notes": "", "bunting": true }]
        }
    })
}

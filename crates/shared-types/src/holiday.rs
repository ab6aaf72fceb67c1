//! Holiday feed document shape.
//!
//! The feed is a JSON object keyed by division identifier, e.g.
//! `{"england-and-wales": {"division": "...", "events": [{"title": "...", "date": "2025-12-25"}]}}`.
//! Only each event's `date` drives computation; unknown fields are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Ordered set of non-working civil dates for one division.
pub type HolidaySet = BTreeSet<NaiveDate>;

/// Whole feed document: division identifier -> division calendar.
pub type HolidayFeed = HashMap<String, HolidayDivision>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HolidayDivision {
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub events: Vec<HolidayEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HolidayEvent {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
}

impl HolidayDivision {
    pub fn dates(&self) -> HolidaySet {
        self.events.iter().map(|e| e.date).collect()
    }
}

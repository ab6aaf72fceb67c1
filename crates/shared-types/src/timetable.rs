use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named deadline produced by the engine.
///
/// `due_at` is always the configured deadline clock time in the anchor
/// timezone, stored as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedDeadline {
    pub name: String,
    pub due_at: DateTime<Utc>,
    /// Configured business-day offset from the case start.
    pub business_days: u32,
    /// Extra business days added to step over holidays.
    pub holidays_skipped: u32,
}

/// Every deadline computed for one case, keyed by deadline name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub case_type: String,
    /// `None` when the case type belongs to an expedited family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_type: Option<String>,
    pub division: String,
    pub deadlines: BTreeMap<String, ComputedDeadline>,
}

impl Timetable {
    pub fn get(&self, name: &str) -> Option<&ComputedDeadline> {
        self.deadlines.get(name)
    }

    pub fn due_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.deadlines.get(name).map(|d| d.due_at)
    }
}

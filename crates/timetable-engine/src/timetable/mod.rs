//! Statutory deadline timetable engine
//!
//! Converts a case's start instant, case type, and procedure type into
//! named deadlines:
//! 1. Normalise the start to the daytime stamp in the anchor timezone
//! 2. Step the configured number of business days (weekends only)
//! 3. Extend past holidays until no new holiday enters the range
//! 4. Stamp the result at the deadline clock time

pub mod business_days;
pub mod calculator;
pub mod clock;
pub mod holiday_resolver;
pub mod policy;

use std::sync::Arc;

use shared_types::AppError;

use crate::config::{EngineSettings, LoadedConfig};
use crate::holidays::HolidayCache;
use policy::DeadlinePolicyTable;

/// Entry point for timetable and single-date calculations.
///
/// Holds immutable settings and policy plus a shared handle to the
/// process-wide holiday cache.
#[derive(Debug, Clone)]
pub struct TimetableEngine {
    settings: EngineSettings,
    policy: Arc<DeadlinePolicyTable>,
    holidays: Arc<HolidayCache>,
}

impl TimetableEngine {
    pub fn new(
        settings: EngineSettings,
        policy: DeadlinePolicyTable,
        holidays: Arc<HolidayCache>,
    ) -> Self {
        Self {
            settings,
            policy: Arc::new(policy),
            holidays,
        }
    }

    /// Build the engine and its holiday cache from validated configuration.
    pub fn from_config(config: LoadedConfig) -> Result<Self, AppError> {
        let holidays = HolidayCache::from_settings(&config.settings.holiday_feed)?;
        Ok(Self::new(config.settings, config.policy, Arc::new(holidays)))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn policy(&self) -> &DeadlinePolicyTable {
        &self.policy
    }

    pub fn holidays(&self) -> &Arc<HolidayCache> {
        &self.holidays
    }

    pub fn division(&self) -> &str {
        &self.settings.holiday_feed.division
    }
}

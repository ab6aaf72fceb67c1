use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "validation")]
use validator::Validate;

pub const DEFAULT_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_HOLIDAY_FEED_URL: &str = "https://www.gov.uk/bank-holidays.json";
pub const DEFAULT_DIVISION: &str = "england-and-wales";
pub const DEFAULT_PROCEDURE: &str = "written";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

/// Top-level config file structure matching `config.toml`.
///
/// Every section has defaults so a file containing only the policy table
/// is enough to start the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct EngineConfig {
    #[serde(default)]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub clock: ClockConfig,
    #[serde(default)]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub holiday_feed: HolidayFeedConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Anchor timezone and the two wall-clock stamps applied to every date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct ClockConfig {
    #[serde(default = "default_timezone")]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Timezone is required"))
    )]
    pub timezone: String,
    /// Stamp applied to a start date before any arithmetic.
    #[serde(default = "ClockTime::daytime")]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub daytime: ClockTime,
    /// Stamp applied to every computed deadline.
    #[serde(default = "ClockTime::end_of_day")]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub deadline: ClockTime,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            daytime: ClockTime::daytime(),
            deadline: ClockTime::end_of_day(),
        }
    }
}

/// A civil wall-clock time of day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct ClockTime {
    #[cfg_attr(
        feature = "validation",
        validate(range(max = 23, message = "Hour must be between 0 and 23"))
    )]
    pub hour: u32,
    #[cfg_attr(
        feature = "validation",
        validate(range(max = 59, message = "Minute must be between 0 and 59"))
    )]
    pub minute: u32,
}

impl ClockTime {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub const fn midnight() -> Self {
        Self::new(0, 0)
    }

    pub const fn daytime() -> Self {
        Self::new(9, 0)
    }

    pub const fn end_of_day() -> Self {
        Self::new(23, 59)
    }
}

/// Where non-working days are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct HolidayFeedConfig {
    #[serde(default = "default_feed_url")]
    #[cfg_attr(
        feature = "validation",
        validate(url(message = "Holiday feed URL must be a valid URL"))
    )]
    pub url: String,
    #[serde(default = "default_division")]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Division is required"))
    )]
    pub division: String,
    #[serde(default = "default_timeout_secs")]
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, message = "Timeout must be at least 1 second"))
    )]
    pub timeout_secs: u64,
}

impl Default for HolidayFeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            division: default_division(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Raw deadline policy table, validated by the engine at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    #[serde(default = "default_procedure")]
    pub default_procedure: String,
    /// Case type -> case-type family.
    #[serde(default)]
    pub case_types: BTreeMap<String, String>,
    #[serde(default)]
    pub families: BTreeMap<String, FamilyConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_procedure: default_procedure(),
            case_types: BTreeMap::new(),
            families: BTreeMap::new(),
        }
    }
}

/// One case-type family's rows.
///
/// Expedited families carry a single `deadlines` row; all others carry one
/// row per procedure type under `procedures`. Offsets are signed here so
/// that a negative value reaches validation instead of failing as a type
/// error with no context.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FamilyConfig {
    #[serde(default)]
    pub expedited: bool,
    #[serde(default)]
    pub deadlines: BTreeMap<String, i64>,
    #[serde(default)]
    pub procedures: BTreeMap<String, BTreeMap<String, i64>>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_feed_url() -> String {
    DEFAULT_HOLIDAY_FEED_URL.to_string()
}

fn default_division() -> String {
    DEFAULT_DIVISION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FEED_TIMEOUT_SECS
}

fn default_procedure() -> String {
    DEFAULT_PROCEDURE.to_string()
}

use chrono_tz::Tz;
use shared_types::{AppError, ClockTime, EngineConfig};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error_convert::ValidateConfig;
use crate::timetable::policy::DeadlinePolicyTable;

/// Path to the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable overriding [`CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "TIMETABLE_CONFIG";

/// Validated clock and holiday-feed settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub timezone: Tz,
    pub daytime: ClockTime,
    pub deadline: ClockTime,
    pub holiday_feed: FeedSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub url: String,
    pub division: String,
    pub timeout: Duration,
}

/// Everything the engine needs, validated and ready to use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: EngineSettings,
    pub policy: DeadlinePolicyTable,
}

/// Load `.env`, read the config file named by `TIMETABLE_CONFIG` (or
/// `config.toml`), apply environment overrides, and validate.
///
/// Unlike optional integrations, a missing or malformed file is fatal: the
/// engine must not compute deadlines from a guessed policy.
pub fn load_config() -> Result<LoadedConfig, AppError> {
    let _ = dotenvy::dotenv();
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
    load_config_from(path, |key| std::env::var(key).ok())
}

/// Load from an explicit path with an explicit environment lookup.
pub fn load_config_from(
    path: impl AsRef<Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<LoadedConfig, AppError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::configuration(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let mut config = parse_config(&contents)?;
    apply_env_overrides(&mut config, env)?;
    let loaded = validate_config(&config)?;

    tracing::info!(
        path = %path.display(),
        timezone = loaded.settings.timezone.name(),
        division = %loaded.settings.holiday_feed.division,
        case_types = loaded.policy.case_types().count(),
        "Timetable configuration loaded"
    );
    Ok(loaded)
}

/// Parse TOML into the raw config shape.
pub fn parse_config(contents: &str) -> Result<EngineConfig, AppError> {
    toml::from_str(contents)
        .map_err(|e| AppError::configuration(format!("Failed to parse configuration: {}", e)))
}

/// Apply `HOLIDAY_FEED_URL`, `HOLIDAY_DIVISION`, `HOLIDAY_FEED_TIMEOUT_SECS`
/// and `TIMETABLE_TIMEZONE` over the file values.
pub fn apply_env_overrides(
    config: &mut EngineConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), AppError> {
    if let Some(url) = env("HOLIDAY_FEED_URL") {
        config.holiday_feed.url = url;
    }
    if let Some(division) = env("HOLIDAY_DIVISION") {
        config.holiday_feed.division = division;
    }
    if let Some(timeout) = env("HOLIDAY_FEED_TIMEOUT_SECS") {
        config.holiday_feed.timeout_secs = timeout.trim().parse().map_err(|_| {
            let mut fields = HashMap::new();
            fields.insert(
                "holiday_feed.timeout_secs".to_string(),
                format!("HOLIDAY_FEED_TIMEOUT_SECS must be a whole number, got '{timeout}'"),
            );
            AppError::invalid_configuration("Invalid environment override", fields)
        })?;
    }
    if let Some(timezone) = env("TIMETABLE_TIMEZONE") {
        config.clock.timezone = timezone;
    }
    Ok(())
}

/// Validate every section, reporting all problems at once.
pub fn validate_config(config: &EngineConfig) -> Result<LoadedConfig, AppError> {
    let mut error = AppError::invalid_configuration("Configuration validation failed", HashMap::new());

    if let Err(e) = config.validate_config() {
        error.field_errors.extend(e.field_errors);
    }

    let timezone = match config.clock.timezone.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            error.field_errors.insert(
                "clock.timezone".to_string(),
                format!("Unknown timezone '{}'", config.clock.timezone),
            );
            None
        }
    };

    let policy = match DeadlinePolicyTable::from_config(&config.policy) {
        Ok(policy) => Some(policy),
        Err(e) => {
            error = error.with_prefixed_fields("policy", e);
            None
        }
    };

    match (timezone, policy) {
        (Some(timezone), Some(policy)) if error.field_errors.is_empty() => Ok(LoadedConfig {
            settings: EngineSettings {
                timezone,
                daytime: config.clock.daytime,
                deadline: config.clock.deadline,
                holiday_feed: FeedSettings {
                    url: config.holiday_feed.url.clone(),
                    division: config.holiday_feed.division.clone(),
                    timeout: Duration::from_secs(config.holiday_feed.timeout_secs),
                },
            },
            policy,
        }),
        _ => {
            tracing::error!(fields = ?error.field_errors, "Timetable configuration rejected");
            Err(error)
        }
    }
}

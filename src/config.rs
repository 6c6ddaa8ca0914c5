use chrono::{FixedOffset, NaiveDateTime, TimeDelta, Utc};
use std::time::Duration;
use thiserror::Error;

/// Mexico City, where the agenda's venues are.
const DEFAULT_UTC_OFFSET: FixedOffset = match FixedOffset::west_opt(6 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid default UTC offset"),
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings of the contract engine.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    /// Minimum free time between two events booked on the same date.
    pub min_gap: TimeDelta,
    /// Offset of the venue's wall clock, used to decide whether an event is
    /// running or already over.
    pub utc_offset: FixedOffset,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_gap: TimeDelta::minutes(60),
            utc_offset: DEFAULT_UTC_OFFSET,
        }
    }
}

impl ScheduleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gap_minutes: i64 = parse_env("MIN_EVENT_GAP_MINUTES", 60)?;
        if gap_minutes < 0 {
            return Err(ConfigError::Invalid {
                name: "MIN_EVENT_GAP_MINUTES",
                value: gap_minutes.to_string(),
            });
        }

        let offset_minutes: i32 = parse_env("EVENT_UTC_OFFSET_MINUTES", -360)?;
        let utc_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or(ConfigError::Invalid {
                name: "EVENT_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        Ok(Self {
            min_gap: TimeDelta::minutes(gap_minutes),
            utc_offset,
        })
    }

    /// Current wall-clock time at the venue.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }
}

/// Process-level settings read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// How often stored statuses are re-derived; `None` disables the sweeper.
    pub status_sweep_interval: Option<Duration>,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let sweep_secs: u64 = parse_env("STATUS_SWEEP_INTERVAL_SECS", 300)?;

        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            jwt_secret: required_env("JWT_SECRET")?,
            status_sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            schedule: ScheduleConfig::from_env()?,
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

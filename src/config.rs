use std::{env, str::FromStr, time::Duration};

use chrono_tz::Tz;

use crate::{error::ConfigError, models::CheckTime};

pub const DEFAULT_CHECK_TIMES: &str = "09:00,13:00,16:00";
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";
pub const MAX_LOG_LIMIT: usize = 1000;
/// A pass overrunning one tick must still leave a wake inside every minute.
pub const MAX_WAKE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub finnhub_api_key: String,

    pub timezone: Tz,
    pub check_times: Vec<CheckTime>,
    pub wake_interval: Duration,
    pub call_timeout: Duration,
    pub log_limit: usize,
}

pub fn load() -> Result<Settings, ConfigError> {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    Settings::from_lookup(|key| env::var(key).ok())
}

impl Settings {
    /// Builds settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mongodb_uri = get("MONGODB_URI")
            .or_else(|| get("DATABASE_URL"))
            .ok_or(ConfigError::MissingStoreUri)?;
        let mongodb_db = get("MONGODB_DB").unwrap_or_else(|| "pricewatch".to_string());
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", get("PORT"), 10000u16)?;

        let finnhub_api_key = get("FINNHUB_API_KEY").unwrap_or_default();

        let tz_name = get("CHECK_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_name.parse::<Tz>().map_err(|e| ConfigError::Invalid {
            key: "CHECK_TIMEZONE",
            reason: e.to_string(),
        })?;

        let check_times = parse_check_times(
            &get("CHECK_TIMES").unwrap_or_else(|| DEFAULT_CHECK_TIMES.to_string()),
        )?;

        let wake_secs = parse_or("WAKE_INTERVAL_SECS", get("WAKE_INTERVAL_SECS"), 30u64)?;
        if !(1..=MAX_WAKE_INTERVAL_SECS).contains(&wake_secs) {
            return Err(ConfigError::Invalid {
                key: "WAKE_INTERVAL_SECS",
                reason: format!("{wake_secs} is outside 1..={MAX_WAKE_INTERVAL_SECS}"),
            });
        }

        let timeout_secs = parse_or("CALL_TIMEOUT_SECS", get("CALL_TIMEOUT_SECS"), 10u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "CALL_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let log_limit = parse_or("LOG_LIMIT", get("LOG_LIMIT"), 200usize)?;
        if !(1..=MAX_LOG_LIMIT).contains(&log_limit) {
            return Err(ConfigError::Invalid {
                key: "LOG_LIMIT",
                reason: format!("{log_limit} is outside 1..={MAX_LOG_LIMIT}"),
            });
        }

        Ok(Settings {
            mongodb_uri,
            mongodb_db,
            host,
            port,
            finnhub_api_key,
            timezone,
            check_times,
            wake_interval: Duration::from_secs(wake_secs),
            call_timeout: Duration::from_secs(timeout_secs),
            log_limit,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("{v:?}: {e}"),
        }),
    }
}

/// Parses `HH:MM,HH:MM,...` into a sorted, duplicate-free list.
pub fn parse_check_times(raw: &str) -> Result<Vec<CheckTime>, ConfigError> {
    let mut times = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<CheckTime>()
                .map_err(|reason| ConfigError::Invalid { key: "CHECK_TIMES", reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if times.is_empty() {
        return Err(ConfigError::Invalid {
            key: "CHECK_TIMES",
            reason: "at least one check time is required".to_string(),
        });
    }

    times.sort();
    times.dedup();
    Ok(times)
}

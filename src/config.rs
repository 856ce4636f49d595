use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::cache::{CACHE_FILENAME, DEFAULT_STALE_AFTER_HOURS};
use crate::error::{Error, Result};
use crate::parser::DEFAULT_CUTOFF_HOUR;
use crate::source::ECB_DAILY_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rates_url: String,
    pub cache_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub cutoff_hour: u32,
    pub stale_after_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates_url: ECB_DAILY_URL.to_string(),
            cache_dir: PathBuf::from("cache"),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            stale_after_hours: DEFAULT_STALE_AFTER_HOURS,
        }
    }
}

impl Config {
    /// Reads `EUROFXREF_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("EUROFXREF_URL") {
            config.rates_url = url;
        }
        if let Some(dir) = lookup("EUROFXREF_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "EUROFXREF_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(Error::Config("EUROFXREF_TIMEOUT_SECS must be positive".into()));
            }
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(hour) = parse_var::<u32>(&lookup, "EUROFXREF_CUTOFF_HOUR")? {
            if hour > 23 {
                return Err(Error::Config(format!("EUROFXREF_CUTOFF_HOUR {hour} is not an hour of day")));
            }
            config.cutoff_hour = hour;
        }
        if let Some(hours) = parse_var::<i64>(&lookup, "EUROFXREF_STALE_AFTER_HOURS")? {
            if hours <= 0 {
                return Err(Error::Config("EUROFXREF_STALE_AFTER_HOURS must be positive".into()));
            }
            config.stale_after_hours = hours;
        }

        Ok(config)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILENAME)
    }

    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::hours(self.stale_after_hours)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key}={raw:?} is not a valid number"))),
        None => Ok(None),
    }
}

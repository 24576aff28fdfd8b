use std::env;
use std::path::PathBuf;

use log::LevelFilter;

use crate::logging::parse_level;

pub const DEFAULT_DATABASE_URL: &str = "tracker.db";

/// Runtime settings read from the environment (and `.env`, loaded by the
/// binary before this runs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `TRACKER_PASSCODE`; unset or empty leaves the tracker open.
    pub passcode: Option<String>,
    /// `LIFTLOG_LOG`
    pub log_level: LevelFilter,
    /// `LIFTLOG_LOG_FILE`
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            passcode: None,
            log_level: LevelFilter::Warn,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            passcode: non_empty("TRACKER_PASSCODE"),
            log_level: non_empty("LIFTLOG_LOG")
                .and_then(|l| parse_level(&l))
                .unwrap_or(defaults.log_level),
            log_file: non_empty("LIFTLOG_LOG_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn variables_are_read() {
        let config = config_from(&[
            ("DATABASE_URL", "/data/lifts.db"),
            ("TRACKER_PASSCODE", "hunter2"),
            ("LIFTLOG_LOG", "debug"),
            ("LIFTLOG_LOG_FILE", "liftlog.log"),
        ]);
        assert_eq!(config.database_url, "/data/lifts.db");
        assert_eq!(config.passcode.as_deref(), Some("hunter2"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("liftlog.log")));
    }

    #[test]
    fn blank_or_bad_values_fall_back() {
        let config = config_from(&[("TRACKER_PASSCODE", ""), ("LIFTLOG_LOG", "chatty")]);
        assert_eq!(config.passcode, None);
        assert_eq!(config.log_level, LevelFilter::Warn);
    }
}

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BORGMATIC: &str = "/usr/local/bin/borgmatic";
pub const DEFAULT_ARCHIVE: &str = "latest";
pub const DEFAULT_OVERDUE_HOURS: i64 = 24;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SUDO: &str = "sudo";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("overdue threshold must not be negative, got {0}")]
    NegativeOverdue(i64),
    #[error("overdue threshold of {0} hours is too large")]
    OverdueTooLarge(i64),
    #[error("timeout must be at least one second")]
    ZeroTimeout,
    #[error("borgmatic path is empty")]
    EmptyBorgmaticPath,
}

/// Where and how status lines are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// One bare line on stdout, as nagios/icinga expect.
    Plugin,
    /// Timestamped log lines, to a file or stdout.
    Plain,
}

/// The resolved options of a single check run. Built once and never changed afterwards.
#[derive(Clone, Debug)]
pub struct CheckConfiguration {
    pub host: Option<String>,
    pub repository: Option<String>,
    pub config_file: Option<PathBuf>,
    pub archive: String,
    pub overdue_hours: u32,
    pub run_as_root: bool,
    pub sudo: PathBuf,
    pub borgmatic: PathBuf,
    pub verbose: bool,
    pub output_mode: OutputMode,
    pub log_file: Option<PathBuf>,
    pub stats: bool,
    pub timeout: Duration,
}

impl Default for CheckConfiguration {
    fn default() -> Self {
        CheckConfiguration {
            host: None,
            repository: None,
            config_file: None,
            archive: DEFAULT_ARCHIVE.to_owned(),
            overdue_hours: DEFAULT_OVERDUE_HOURS as u32,
            run_as_root: false,
            sudo: PathBuf::from(DEFAULT_SUDO),
            borgmatic: PathBuf::from(DEFAULT_BORGMATIC),
            verbose: false,
            output_mode: OutputMode::Plain,
            log_file: None,
            stats: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CheckConfiguration {
    /// Validates the raw threshold and timeout values before they land in a configuration.
    pub fn validate_overdue(hours: i64) -> Result<u32, ConfigError> {
        if hours < 0 {
            return Err(ConfigError::NegativeOverdue(hours));
        }
        u32::try_from(hours).map_err(|_| ConfigError::OverdueTooLarge(hours))
    }

    pub fn validate_timeout(seconds: u64) -> Result<Duration, ConfigError> {
        if seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Duration::from_secs(seconds))
    }

    /// Checks invariants that span several fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.borgmatic.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBorgmaticPath);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn overdue_threshold(&self) -> f64 {
        f64::from(self.overdue_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckConfiguration::default();
        assert_eq!(config.archive, "latest");
        assert_eq!(config.overdue_hours, 24);
        assert_eq!(config.borgmatic, PathBuf::from("/usr/local/bin/borgmatic"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.repository.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_overdue() {
        assert_eq!(CheckConfiguration::validate_overdue(0), Ok(0));
        assert_eq!(CheckConfiguration::validate_overdue(48), Ok(48));
        assert_eq!(
            CheckConfiguration::validate_overdue(-1),
            Err(ConfigError::NegativeOverdue(-1))
        );
        assert_eq!(
            CheckConfiguration::validate_overdue(i64::from(u32::MAX)),
            Ok(u32::MAX)
        );
        assert_eq!(
            CheckConfiguration::validate_overdue(i64::from(u32::MAX) + 1),
            Err(ConfigError::OverdueTooLarge(4_294_967_296))
        );
    }

    #[test]
    fn test_validate_timeout_and_paths() {
        assert_eq!(
            CheckConfiguration::validate_timeout(0),
            Err(ConfigError::ZeroTimeout)
        );

        let config = CheckConfiguration {
            borgmatic: PathBuf::new(),
            ..CheckConfiguration::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBorgmaticPath));
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    CheckConfiguration, ConfigError, OutputMode, DEFAULT_ARCHIVE, DEFAULT_BORGMATIC,
    DEFAULT_OVERDUE_HOURS, DEFAULT_SUDO, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "check_borg",
    version,
    about = "Nagios check reporting whether the latest borg archive is overdue"
)]
pub struct Cli {
    /// Host the check runs for; informational only
    #[arg(short = 'H', long = "host")]
    pub host: Option<String>,
    /// Repository to check
    #[arg(short = 'r', long)]
    pub repository: Option<String>,
    /// Borgmatic config file
    #[arg(short = 'c', long = "config-file")]
    pub config_file: Option<String>,
    /// Archive to check
    #[arg(short = 'a', long, default_value = DEFAULT_ARCHIVE)]
    pub archive: String,
    /// Hours after which the repository is overdue
    #[arg(
        short = 'd',
        long,
        default_value_t = DEFAULT_OVERDUE_HOURS,
        allow_negative_numbers = true
    )]
    pub overdue: i64,
    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
    /// Path to the borgmatic executable
    #[arg(long, default_value = DEFAULT_BORGMATIC)]
    pub borgmatic: PathBuf,
    /// File to log to (default = stdout)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
    /// Enable nagios output mode
    #[arg(long)]
    pub nagios: bool,
    /// Run the borgmatic command through sudo
    #[arg(long = "run-as-root")]
    pub run_as_root: bool,
    /// Elevation wrapper used with --run-as-root
    #[arg(long, default_value = DEFAULT_SUDO)]
    pub sudo: PathBuf,
    /// Append archive statistics as performance data
    #[arg(long)]
    pub stats: bool,
    /// Seconds to wait for borgmatic before giving up
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl Cli {
    /// Resolves the parsed arguments into a validated configuration.
    ///
    /// Empty repository and config file values are treated as absent.
    pub fn into_config(self) -> Result<CheckConfiguration, ConfigError> {
        let overdue_hours = CheckConfiguration::validate_overdue(self.overdue)?;
        let timeout = CheckConfiguration::validate_timeout(self.timeout)?;

        let config = CheckConfiguration {
            host: self.host.filter(|h| !h.is_empty()),
            repository: self.repository.filter(|r| !r.is_empty()),
            config_file: self
                .config_file
                .filter(|c| !c.is_empty())
                .map(PathBuf::from),
            archive: if self.archive.is_empty() {
                DEFAULT_ARCHIVE.to_owned()
            } else {
                self.archive
            },
            overdue_hours,
            run_as_root: self.run_as_root,
            sudo: self.sudo,
            borgmatic: self.borgmatic,
            verbose: self.verbose,
            output_mode: if self.nagios {
                OutputMode::Plugin
            } else {
                OutputMode::Plain
            },
            log_file: self.log_file,
            stats: self.stats,
            timeout,
        };
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("check_borg").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config.archive, "latest");
        assert_eq!(config.overdue_hours, 24);
        assert_eq!(config.output_mode, OutputMode::Plain);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.stats);
        assert!(!config.run_as_root);
    }

    #[test]
    fn test_all_options() {
        let config = parse(&[
            "-H",
            "backup01",
            "-r",
            "ssh://repo/./borg",
            "-c",
            "/etc/borgmatic/config.yaml",
            "-a",
            "host-2024-01-01",
            "-d",
            "36",
            "-v",
            "--borgmatic",
            "/usr/bin/borgmatic",
            "--log-file",
            "/var/log/check_borg.log",
            "--nagios",
            "--run-as-root",
            "--stats",
            "-t",
            "5",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.host.as_deref(), Some("backup01"));
        assert_eq!(config.repository.as_deref(), Some("ssh://repo/./borg"));
        assert_eq!(
            config.config_file,
            Some(PathBuf::from("/etc/borgmatic/config.yaml"))
        );
        assert_eq!(config.archive, "host-2024-01-01");
        assert_eq!(config.overdue_hours, 36);
        assert!(config.verbose);
        assert_eq!(config.borgmatic, PathBuf::from("/usr/bin/borgmatic"));
        assert_eq!(
            config.log_file,
            Some(PathBuf::from("/var/log/check_borg.log"))
        );
        assert_eq!(config.output_mode, OutputMode::Plugin);
        assert!(config.run_as_root);
        assert!(config.stats);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let config = parse(&["-r", "", "-c", "", "-a", ""]).into_config().unwrap();
        assert!(config.repository.is_none());
        assert!(config.config_file.is_none());
        assert_eq!(config.archive, "latest");
    }

    #[test]
    fn test_negative_overdue() {
        let err = parse(&["-d", "-3"]).into_config().unwrap_err();
        assert_eq!(err, ConfigError::NegativeOverdue(-3));
    }

    #[test]
    fn test_huge_overdue() {
        let err = parse(&["-d", "99999999999"]).into_config().unwrap_err();
        assert_eq!(err, ConfigError::OverdueTooLarge(99_999_999_999));
    }

    #[test]
    fn test_zero_timeout() {
        let err = parse(&["--timeout", "0"]).into_config().unwrap_err();
        assert_eq!(err, ConfigError::ZeroTimeout);
    }
}

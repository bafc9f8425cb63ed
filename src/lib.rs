//! The check_borg crate checks whether the most recent archive of a borg repository is recent
//! enough and reports the result the way nagios and icinga expect it.
//!
//! ```rust
//! # use check_borg::ServiceState;
//! assert_eq!(ServiceState::Warning.exit_code(), 1);
//! assert_eq!(&ServiceState::Critical.to_string(), "CRITICAL");
//! ```

use std::cmp::Ordering;
use std::fmt;

pub mod archive;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod config_generator;
pub mod error;
pub mod fetcher;
pub mod reporter;
pub mod runner;
pub mod size;

pub use crate::archive::{ArchiveInfo, ArchiveStats};
pub use crate::classifier::{classify, elapsed_hours, CheckResult};
pub use crate::config::{CheckConfiguration, ConfigError, OutputMode};
pub use crate::error::CheckError;
pub use crate::fetcher::{fetch_archive_info, CommandExecutor, CommandOutput, SystemExecutor};
pub use crate::reporter::{LevelLabels, Reporter};
pub use crate::runner::{run_check, Runner};
pub use crate::size::{format_size, SizeUnit};

/// Represents a service state from nagios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ServiceState::Unknown => 0,
            ServiceState::Ok => 1,
            ServiceState::Warning => 2,
            ServiceState::Critical => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl PartialOrd for ServiceState {
    fn partial_cmp(&self, other: &ServiceState) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceState {
    fn cmp(&self, other: &ServiceState) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

//! Turns the age of an archive into a service state and the message nagios shows.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{Duration, NaiveDateTime};

use crate::archive::ArchiveStats;
use crate::error::CheckError;
use crate::size::format_size;
use crate::ServiceState;

/// How far an archive's end may lie in the future before the clock is considered broken.
pub const CLOCK_SKEW_TOLERANCE_SECS: i64 = 300;

/// The outcome of one check run.
///
/// ```rust
/// # use check_borg::{classify, ServiceState};
/// let result = classify(23.9, 24.0, None);
/// assert_eq!(result.state(), ServiceState::Ok);
/// assert_eq!(&result.to_nagios_string(), "BORG OK: 23.9h since last backup.");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult {
    state: ServiceState,
    elapsed_hours: Option<f64>,
    message: String,
    perf_data: Option<String>,
}

impl CheckResult {
    /// A result that could not be classified, e.g. because borgmatic failed.
    ///
    /// Multi-line descriptions are folded into one line, joined with `; `.
    pub fn unknown(description: impl Display) -> CheckResult {
        let description = description
            .to_string()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("; ");
        CheckResult {
            state: ServiceState::Unknown,
            elapsed_hours: None,
            message: format!("BORG UNKNOWN: {}", description),
            perf_data: None,
        }
    }

    pub fn from_error(err: &CheckError) -> CheckResult {
        CheckResult::unknown(err)
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn elapsed_hours(&self) -> Option<f64> {
        self.elapsed_hours
    }

    /// The status message without performance data.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn perf_data(&self) -> Option<&str> {
        self.perf_data.as_deref()
    }

    /// Returns the single line nagios expects: message, then ` | ` and performance data if any.
    pub fn to_nagios_string(&self) -> String {
        match self.perf_data {
            Some(ref perf) => format!("{} | {}", self.message, perf),
            None => self.message.clone(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }
}

/// Rounds to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Hours between `end` and `now`, rounded to one decimal.
///
/// An `end` up to [CLOCK_SKEW_TOLERANCE_SECS] in the future counts as zero hours; anything
/// beyond that is rejected.
pub fn elapsed_hours(end: NaiveDateTime, now: NaiveDateTime) -> Result<f64, CheckError> {
    let age = now - end;
    if age < -Duration::seconds(CLOCK_SKEW_TOLERANCE_SECS) {
        return Err(CheckError::InvalidTimestamp {
            value: end.to_string(),
            reason: format!("lies {}s in the future", -age.num_seconds()),
        });
    }

    let millis = age.num_milliseconds().max(0);
    Ok(round_tenth(millis as f64 / 3_600_000.0))
}

/// Renders archive stats as performance data, without the leading ` | `.
pub fn perf_data(stats: &ArchiveStats) -> String {
    format!(
        "duration={} s, compressed_size={}, original_size={}, deduplicated_size={}",
        stats.duration,
        format_size(stats.compressed_size),
        format_size(stats.original_size),
        format_size(stats.deduplicated_size),
    )
}

/// Classifies an archive age against the overdue threshold.
///
/// Both values are compared after rounding to one decimal: below the threshold is OK, exactly
/// at it is WARNING, above it is CRITICAL. Since ages carry one decimal and thresholds are whole
/// hours, WARNING only shows up for ages of exactly `threshold.0` hours. Values that cannot be
/// compared (NaN) end up UNKNOWN.
pub fn classify(elapsed: f64, threshold: f64, stats: Option<&ArchiveStats>) -> CheckResult {
    let elapsed = round_tenth(elapsed);
    let threshold = round_tenth(threshold);

    let (state, message) = match elapsed.partial_cmp(&threshold) {
        Some(Ordering::Less) => (
            ServiceState::Ok,
            format!("BORG OK: {:.1}h since last backup.", elapsed),
        ),
        Some(Ordering::Equal) => (
            ServiceState::Warning,
            format!(
                "BORG WARNING: {:.1}h since last backup. Archive will become overdue soon!",
                elapsed
            ),
        ),
        Some(Ordering::Greater) => (
            ServiceState::Critical,
            format!(
                "BORG CRITICAL: {:.1}h since last backup. {:.1}h overdue!",
                elapsed,
                round_tenth(elapsed - threshold)
            ),
        ),
        None => (
            ServiceState::Unknown,
            format!("BORG UNKNOWN: {:.1}h since last backup.", elapsed),
        ),
    };

    CheckResult {
        state,
        elapsed_hours: Some(elapsed),
        message,
        perf_data: stats.map(perf_data),
    }
}

//! Model of the JSON emitted by `borgmatic info --json`.
//!
//! Only the fields the check looks at are modelled. Everything else in the response is ignored.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::CheckError;

/// Format of the `end` field, e.g. `2024-03-01T02:15:07.000000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    #[serde(default)]
    archives: Vec<RawArchive>,
}

#[derive(Debug, Deserialize)]
struct RawArchive {
    #[serde(default)]
    name: Option<String>,
    end: String,
    // Kept loose: a broken stats block only costs the performance data, never the verdict.
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    stats: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStats {
    compressed_size: Option<u64>,
    original_size: Option<u64>,
    deduplicated_size: Option<u64>,
}

/// Size and timing figures of an archive, used for the performance data suffix.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveStats {
    /// Seconds the backup took, exactly as borgmatic reported the number.
    pub duration: Number,
    pub compressed_size: u64,
    pub original_size: u64,
    pub deduplicated_size: u64,
}

/// The parts of a single archive the check needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveInfo {
    pub name: Option<String>,
    /// When the archive was completed, in local wall-clock time.
    pub end: NaiveDateTime,
    /// `None` if borgmatic did not report duration and sizes.
    pub stats: Option<ArchiveStats>,
}

impl ArchiveInfo {
    /// Parses the first line of borgmatic's output and extracts `[0].archives[0]`.
    pub fn from_json(line: &str) -> Result<ArchiveInfo, CheckError> {
        let repositories: Vec<RepositoryInfo> = serde_json::from_str(line.trim())?;

        let raw = repositories
            .into_iter()
            .next()
            .ok_or_else(|| CheckError::MalformedResponse("no repository in response".to_owned()))?
            .archives
            .into_iter()
            .next()
            .ok_or_else(|| CheckError::MalformedResponse("no archive in response".to_owned()))?;

        let end = parse_timestamp(&raw.end)?;
        let stats = stats_from(raw.duration, raw.stats);

        Ok(ArchiveInfo {
            name: raw.name,
            end,
            stats,
        })
    }
}

fn stats_from(duration: Option<Value>, stats: Option<Value>) -> Option<ArchiveStats> {
    let duration = match duration? {
        Value::Number(n) => n,
        other => {
            log::debug!("ignoring non-numeric duration {}", other);
            return None;
        }
    };
    let stats: RawStats = match serde_json::from_value(stats?) {
        Ok(stats) => stats,
        Err(e) => {
            log::debug!("ignoring unreadable stats: {}", e);
            return None;
        }
    };

    Some(ArchiveStats {
        duration,
        compressed_size: stats.compressed_size?,
        original_size: stats.original_size?,
        deduplicated_size: stats.deduplicated_size?,
    })
}

/// Parses a borg timestamp such as `2024-03-01T02:15:07.000000`.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, CheckError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| {
        CheckError::InvalidTimestamp {
            value: value.to_owned(),
            reason: e.to_string(),
        }
    })
}

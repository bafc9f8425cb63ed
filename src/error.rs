use crate::config::ConfigError;

/// Everything that can keep a check from reaching a verdict. Each of these ends up as an
/// UNKNOWN service state.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("{program} returned no output")]
    EmptyOutput { program: String },
    #[error("{program} did not finish within {seconds}s")]
    Timeout { program: String, seconds: u64 },
    #[error("malformed borgmatic response: {0}")]
    MalformedResponse(String),
    #[error("invalid archive timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("invalid arguments: {0}")]
    Arguments(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::MalformedResponse(err.to_string())
    }
}

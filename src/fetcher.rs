//! Runs `borgmatic info --json` and turns its answer into an [ArchiveInfo].

use std::ffi::OsString;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::archive::ArchiveInfo;
use crate::config::CheckConfiguration;
use crate::error::CheckError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// What a finished child process left behind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    /// Human readable exit status, e.g. `exit status: 2`.
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Executes an argument vector. The first element is the program.
pub trait CommandExecutor {
    fn execute(&self, argv: &[OsString], timeout: Duration) -> Result<CommandOutput, CheckError>;
}

/// Builds the argument vector for the borgmatic call described by `config`.
///
/// Repository and config file are left out entirely when not set.
pub fn build_command(config: &CheckConfiguration) -> Vec<OsString> {
    let mut argv: Vec<OsString> = Vec::new();

    if config.run_as_root {
        argv.push(config.sudo.clone().into_os_string());
    }
    argv.push(config.borgmatic.clone().into_os_string());
    argv.push("info".into());
    argv.push("--json".into());

    if let Some(ref config_file) = config.config_file {
        argv.push("-c".into());
        argv.push(config_file.clone().into_os_string());
    }

    argv.push("--archive".into());
    argv.push(config.archive.clone().into());

    if let Some(ref repository) = config.repository {
        argv.push("--repository".into());
        argv.push(repository.into());
    }

    argv
}

/// Renders an argument vector for log output.
pub fn command_line(argv: &[OsString]) -> String {
    argv.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The last non-empty line, which is where tracebacks and borg put the actual error.
fn last_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
}

fn program_name(argv: &[OsString]) -> String {
    argv.first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Asks borgmatic about the configured archive.
pub fn fetch_archive_info(
    config: &CheckConfiguration,
    executor: &dyn CommandExecutor,
) -> Result<ArchiveInfo, CheckError> {
    let argv = build_command(config);
    let program = program_name(&argv);

    let output = executor.execute(&argv, config.timeout)?;
    log::debug!(
        "{} finished with {} ({} bytes stdout, {} bytes stderr)",
        program,
        output.status,
        output.stdout.len(),
        output.stderr.len()
    );

    if !output.success {
        return Err(CheckError::NonZeroExit {
            program,
            status: output.status,
            stderr: last_line(&output.stderr).to_owned(),
        });
    }

    let line = output.stdout.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(CheckError::EmptyOutput { program });
    }

    ArchiveInfo::from_json(line)
}

/// Runs commands as child processes and kills them once the timeout has passed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, argv: &[OsString], timeout: Duration) -> Result<CommandOutput, CheckError> {
        let (program, args) = argv.split_first().ok_or_else(|| CheckError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;
        let program_display = program.to_string_lossy().into_owned();

        log::debug!("spawning {:?}", argv);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CheckError::Spawn {
                program: program_display.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                log::warn!("{} timed out after {:?}, killing it", program_display, timeout);
                // the child may have exited in the meantime
                let _ = child.kill();
                let _ = child.wait();
                return Err(CheckError::Timeout {
                    program: program_display,
                    seconds: timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        // A grandchild may still hold the pipes open, so reading is bound by the same deadline.
        let (stdout, stderr) = match (collect(stdout, deadline), collect(stderr, deadline)) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                log::warn!("{} exited but its output stayed open", program_display);
                return Err(CheckError::Timeout {
                    program: program_display,
                    seconds: timeout.as_secs(),
                });
            }
        };

        Ok(CommandOutput {
            success: status.success(),
            status: status.to_string(),
            stdout,
            stderr,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            log::warn!("reading child output failed: {}", e);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Waits for a drained pipe until `deadline`. `None` means the pipe was still open.
fn collect(rx: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let rx = match rx {
        Some(rx) => rx,
        None => return Some(String::new()),
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

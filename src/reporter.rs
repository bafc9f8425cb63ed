//! Writes status lines, either as a bare nagios line or as timestamped log records.

use std::fs::OpenOptions;
use std::io::{self, Write};

use chrono::Local;

use crate::config::{CheckConfiguration, OutputMode};
use crate::error::CheckError;
use crate::ServiceState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Names printed for each level in log records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelLabels {
    pub debug: &'static str,
    pub ok: &'static str,
    pub warning: &'static str,
    pub critical: &'static str,
    pub unknown: &'static str,
}

impl LevelLabels {
    /// Regular log level names.
    pub const PLAIN: LevelLabels = LevelLabels {
        debug: "DEBUG",
        ok: "INFO",
        warning: "WARNING",
        critical: "CRITICAL",
        unknown: "UNKNOWN",
    };

    /// Level names matching the nagios service states.
    pub const PLUGIN: LevelLabels = LevelLabels {
        debug: "DEBUG",
        ok: "OK",
        warning: "WARNING",
        critical: "CRITICAL",
        unknown: "UNKNOWN",
    };

    pub fn for_mode(mode: OutputMode) -> LevelLabels {
        match mode {
            OutputMode::Plugin => LevelLabels::PLUGIN,
            OutputMode::Plain => LevelLabels::PLAIN,
        }
    }

    pub fn label(&self, state: ServiceState) -> &'static str {
        match state {
            ServiceState::Ok => self.ok,
            ServiceState::Warning => self.warning,
            ServiceState::Critical => self.critical,
            ServiceState::Unknown => self.unknown,
        }
    }
}

/// The single place status output goes through. Built once per run from the configuration.
///
/// In plugin mode the status line is written bare to the primary sink. A log file, if
/// configured, additionally receives a timestamped record. In plain mode every line is a
/// timestamped record on the primary sink, which is the log file if one is configured.
pub struct Reporter {
    sink: Box<dyn Write>,
    journal: Option<Box<dyn Write>>,
    labels: LevelLabels,
    mode: OutputMode,
    verbose: bool,
}

impl Reporter {
    pub fn new(sink: Box<dyn Write>, mode: OutputMode, verbose: bool) -> Reporter {
        Reporter {
            sink,
            journal: None,
            labels: LevelLabels::for_mode(mode),
            mode,
            verbose,
        }
    }

    /// Attaches a secondary sink receiving timestamped records in plugin mode.
    pub fn with_journal(mut self, journal: Box<dyn Write>) -> Reporter {
        self.journal = Some(journal);
        self
    }

    pub fn from_config(config: &CheckConfiguration) -> Result<Reporter, CheckError> {
        let log_file = match config.log_file {
            Some(ref path) => Some(Box::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            ) as Box<dyn Write>),
            None => None,
        };

        let reporter = match (config.output_mode, log_file) {
            (OutputMode::Plain, Some(file)) => Reporter::new(file, OutputMode::Plain, config.verbose),
            (OutputMode::Plugin, Some(file)) => {
                Reporter::new(Box::new(io::stdout()), OutputMode::Plugin, config.verbose)
                    .with_journal(file)
            }
            (mode, None) => Reporter::new(Box::new(io::stdout()), mode, config.verbose),
        };

        Ok(reporter)
    }

    pub fn labels(&self) -> &LevelLabels {
        &self.labels
    }

    /// Writes the status line for `state`.
    pub fn emit(&mut self, state: ServiceState, message: &str) -> io::Result<()> {
        let label = self.labels.label(state);
        match self.mode {
            OutputMode::Plugin => {
                writeln!(self.sink, "{}", message)?;
                self.sink.flush()?;
                if let Some(ref mut journal) = self.journal {
                    write_record(journal.as_mut(), label, message)?;
                }
            }
            OutputMode::Plain => write_record(self.sink.as_mut(), label, message)?,
        }
        Ok(())
    }

    /// Writes a debug record. Only verbose plain mode shows these.
    pub fn debug(&mut self, message: &str) -> io::Result<()> {
        if !self.verbose || self.mode == OutputMode::Plugin {
            return Ok(());
        }
        let label = self.labels.debug;
        write_record(self.sink.as_mut(), label, message)
    }
}

fn write_record(sink: &mut dyn Write, label: &str, message: &str) -> io::Result<()> {
    writeln!(
        sink,
        "{} {} {}",
        Local::now().format(TIMESTAMP_FORMAT),
        label,
        message
    )?;
    sink.flush()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.borrow().clone())
                .unwrap()
                .lines()
                .map(|l| l.to_owned())
                .collect()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Drops the `YYYY-MM-DD HH:MM:SS,mmm ` prefix of a record.
    fn strip_timestamp(line: &str) -> &str {
        assert!(line.len() > 24, "record too short: {:?}", line);
        assert!(line[..4].chars().all(|c| c.is_ascii_digit()));
        &line[24..]
    }

    #[test]
    fn test_labels() {
        assert_eq!(LevelLabels::PLAIN.label(ServiceState::Ok), "INFO");
        assert_eq!(LevelLabels::PLUGIN.label(ServiceState::Ok), "OK");
        assert_eq!(LevelLabels::PLUGIN.label(ServiceState::Unknown), "UNKNOWN");
        assert_eq!(
            LevelLabels::for_mode(OutputMode::Plain).label(ServiceState::Critical),
            "CRITICAL"
        );
    }

    #[test]
    fn test_plugin_mode_is_bare() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()), OutputMode::Plugin, true);
        reporter.debug("Running os command line : borgmatic").unwrap();
        reporter
            .emit(ServiceState::Ok, "BORG OK: 1.0h since last backup.")
            .unwrap();

        assert_eq!(buf.lines(), vec!["BORG OK: 1.0h since last backup."]);
    }

    #[test]
    fn test_plugin_mode_journal() {
        let buf = SharedBuf::default();
        let journal = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()), OutputMode::Plugin, false)
            .with_journal(Box::new(journal.clone()));
        reporter
            .emit(ServiceState::Ok, "BORG OK: 1.0h since last backup.")
            .unwrap();

        assert_eq!(buf.lines(), vec!["BORG OK: 1.0h since last backup."]);
        let records = journal.lines();
        assert_eq!(records.len(), 1);
        assert_eq!(
            strip_timestamp(&records[0]),
            "OK BORG OK: 1.0h since last backup."
        );
    }

    #[test]
    fn test_plain_mode_records() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()), OutputMode::Plain, true);
        reporter.debug("Running os command line : borgmatic").unwrap();
        reporter
            .emit(ServiceState::Critical, "BORG CRITICAL: 30.2h since last backup. 6.2h overdue!")
            .unwrap();

        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            strip_timestamp(&lines[0]),
            "DEBUG Running os command line : borgmatic"
        );
        assert_eq!(
            strip_timestamp(&lines[1]),
            "CRITICAL BORG CRITICAL: 30.2h since last backup. 6.2h overdue!"
        );
    }

    #[test]
    fn test_plain_mode_quiet_debug() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()), OutputMode::Plain, false);
        reporter.debug("hidden").unwrap();
        reporter.emit(ServiceState::Ok, "BORG OK: 1.0h since last backup.").unwrap();

        let lines = buf.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_timestamp(&lines[0]), "INFO BORG OK: 1.0h since last backup.");
    }

    #[test]
    fn test_from_config_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check_borg.log");
        let config = CheckConfiguration {
            log_file: Some(path.clone()),
            ..CheckConfiguration::default()
        };

        let mut reporter = Reporter::from_config(&config).unwrap();
        reporter.emit(ServiceState::Warning, "first").unwrap();
        drop(reporter);
        let mut reporter = Reporter::from_config(&config).unwrap();
        reporter.emit(ServiceState::Unknown, "second").unwrap();
        drop(reporter);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(strip_timestamp(lines[0]), "WARNING first");
        assert_eq!(strip_timestamp(lines[1]), "UNKNOWN second");
    }
}

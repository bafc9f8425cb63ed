use chrono::{Local, NaiveDateTime};

use crate::classifier::{classify, elapsed_hours, CheckResult};
use crate::config::CheckConfiguration;
use crate::error::CheckError;
use crate::fetcher::{build_command, command_line, fetch_archive_info, CommandExecutor};
use crate::reporter::Reporter;

/// Runs a check and makes sure every failure ends up as a [CheckResult].
pub struct Runner {
    on_error: Option<Box<dyn FnOnce(&CheckError) -> CheckResult>>,
}

impl Runner {
    pub fn new() -> Self {
        Self { on_error: None }
    }

    pub fn on_error(mut self, f: impl FnOnce(&CheckError) -> CheckResult + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// This will run either the default error handler, which reports UNKNOWN with the error as
    /// description, or the one specified by calling [Runner::on_error].
    pub fn safe_run(self, f: impl FnOnce() -> Result<CheckResult, CheckError>) -> CheckResult {
        match f() {
            Ok(result) => result,
            Err(err) => match self.on_error {
                Some(on_error) => on_error(&err),
                None => CheckResult::from_error(&err),
            },
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new()
    }
}

/// Fetches the archive info, computes its age relative to `now` and classifies it.
pub fn run_check(
    config: &CheckConfiguration,
    executor: &dyn CommandExecutor,
    reporter: &mut Reporter,
    now: NaiveDateTime,
) -> Result<CheckResult, CheckError> {
    reporter.debug(&format!(
        "Running os command line : {}",
        command_line(&build_command(config))
    ))?;

    let info = fetch_archive_info(config, executor)?;
    let elapsed = elapsed_hours(info.end, now)?;
    log::debug!(
        "archive {:?} ended {} ({}h ago)",
        info.name,
        info.end,
        elapsed
    );

    let stats = if config.stats {
        if info.stats.is_none() {
            log::debug!("stats requested but borgmatic reported none");
        }
        info.stats.as_ref()
    } else {
        None
    };

    Ok(classify(elapsed, config.overdue_threshold(), stats))
}

/// Performs a complete run: reporter setup, check, output. Returns the exit code.
pub fn run(config: &CheckConfiguration, executor: &dyn CommandExecutor) -> i32 {
    let mut reporter = match Reporter::from_config(config) {
        Ok(reporter) => reporter,
        Err(err) => return print_fallback(&CheckResult::from_error(&err)),
    };

    let now = Local::now().naive_local();
    let result = Runner::new()
        .on_error(|err| {
            log::warn!("check failed: {:?}", err);
            CheckResult::from_error(err)
        })
        .safe_run(|| run_check(config, executor, &mut reporter, now));

    report(&mut reporter, &result)
}

/// Emits the result through the reporter and returns its exit code.
pub fn report(reporter: &mut Reporter, result: &CheckResult) -> i32 {
    match reporter.emit(result.state(), &result.to_nagios_string()) {
        Ok(()) => result.exit_code(),
        Err(err) => {
            log::warn!("reporter failed: {}", err);
            print_fallback(&CheckResult::from_error(&CheckError::Io(err)))
        }
    }
}

/// Prints the result as a bare line on stdout, for when no reporter is available.
pub fn print_fallback(result: &CheckResult) -> i32 {
    println!("{}", result.to_nagios_string());
    result.exit_code()
}

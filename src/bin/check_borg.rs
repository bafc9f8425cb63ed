//! check_borg - nagios/icinga check for the age of the latest borg archive

use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use check_borg::classifier::CheckResult;
use check_borg::cli::Cli;
use check_borg::config_generator::icinga_command_if_requested;
use check_borg::runner::{print_fallback, run};
use check_borg::{CheckError, SystemExecutor};

fn main() {
    // Diagnostics go to stderr, controlled by RUST_LOG, e.g. RUST_LOG=debug check_borg -r /srv/borg
    env_logger::init();

    match icinga_command_if_requested("borg", &Cli::command()) {
        Ok(Some(definition)) => {
            println!("{}", definition);
            process::exit(0);
        }
        Ok(None) => {}
        Err(e) => process::exit(print_fallback(&CheckResult::unknown(e))),
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let reason = e.to_string();
                let reason = reason.lines().next().unwrap_or("").trim_start_matches("error: ");
                let err = CheckError::Arguments(reason.to_owned());
                process::exit(print_fallback(&CheckResult::from_error(&err)));
            }
        },
    };

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => process::exit(print_fallback(&CheckResult::from_error(&e.into()))),
    };
    log::debug!("resolved configuration: {:?}", config);

    process::exit(run(&config, &SystemExecutor));
}

//! Generates an Icinga2 `CheckCommand` definition from the clap command line, so the check can
//! be wired into icinga without writing the argument mapping by hand.

use std::fmt::Write as _;

/// Environment variable which makes the binary print its Icinga2 command definition.
pub const GENERATE_ENV: &str = "GENERATE_ICINGA_COMMAND";

pub struct IcingaCommand {
    name: String,
    arguments: Vec<IcingaArgument>,
}

struct IcingaArgument {
    flag: String,
    var: String,
    description: Option<String>,
    is_switch: bool,
    default_value: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("executable path is not valid UTF-8")]
    InvalidExecutablePath,
    #[error("argument {0:?} has no long name")]
    MissingLongArgument(String),
}

impl IcingaCommand {
    /// Collects the arguments of `cmd`. Icinga variables are named `<name>_<long_name>`.
    pub fn from_clap(name: &str, cmd: &clap::Command) -> Result<IcingaCommand, GeneratorError> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments() {
            let long = arg
                .get_long()
                .ok_or_else(|| GeneratorError::MissingLongArgument(arg.get_id().to_string()))?;

            let is_switch = !arg.get_action().takes_values();
            let default_value = if is_switch {
                None
            } else {
                arg.get_default_values()
                    .first()
                    .and_then(|v| v.to_str())
                    .map(|s| s.to_owned())
            };

            arguments.push(IcingaArgument {
                flag: format!("--{}", long),
                var: format!("{}_{}", name, long.replace('-', "_")),
                description: arg.get_help().map(|h| h.to_string()),
                is_switch,
                default_value,
            });
        }

        Ok(IcingaCommand {
            name: name.to_owned(),
            arguments,
        })
    }

    /// Renders the definition, pointing `command` at `executable`.
    pub fn render(&self, executable: &str) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "object CheckCommand \"{}\" {{", self.name);
        let _ = writeln!(out, "  command = [ \"{}\" ]", escape(executable));
        let _ = writeln!(out, "  arguments = {{");

        for arg in &self.arguments {
            let _ = writeln!(out, "    \"{}\" = {{", arg.flag);
            if arg.is_switch {
                let _ = writeln!(out, "      set_if = \"${}$\"", arg.var);
            } else {
                let _ = writeln!(out, "      value = \"${}$\"", arg.var);
            }
            if let Some(ref description) = arg.description {
                let _ = writeln!(out, "      description = \"{}\"", escape(description));
            }
            let _ = writeln!(out, "    }}");
        }
        let _ = writeln!(out, "  }}");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|a| a.default_value.as_ref().map(|d| (&a.var, d)))
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
            for (var, default_value) in defaults {
                let _ = writeln!(out, "  vars.{} = \"{}\"", var, escape(default_value));
            }
        }

        out.push('}');
        out
    }
}

fn escape(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut acc, c| {
        if matches!(c, '"' | '$' | '\\') {
            acc.push('\\');
        }
        acc.push(c);
        acc
    })
}

/// Returns the definition for the running executable if [GENERATE_ENV] is set.
pub fn icinga_command_if_requested(
    name: &str,
    cmd: &clap::Command,
) -> Result<Option<String>, GeneratorError> {
    if std::env::var_os(GENERATE_ENV).is_none() {
        return Ok(None);
    }

    let executable = std::env::current_exe()?
        .to_str()
        .ok_or(GeneratorError::InvalidExecutablePath)?
        .to_owned();

    let command = IcingaCommand::from_clap(name, cmd)?;
    Ok(Some(command.render(&executable)))
}

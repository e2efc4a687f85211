use std::path::PathBuf;

use clap::{ArgMatches, Command};
use fstask::{InvocationError, resolve_templates, violations};
use serde::Serialize;

use crate::commands::{CommandResult, with_invocation_args};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct Violation {
    pub kind: String,
    pub message: String,
}

impl From<&InvocationError> for Violation {
    fn from(err: &InvocationError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

pub fn command() -> Command {
    with_invocation_args(
        Command::new("validate").about("Report every problem with a set of bindings"),
    )
}

/// Runs every validation check; template resolution is attempted only when
/// the bindings themselves are valid.
pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let name = matches
        .get_one::<String>("task")
        .map(String::as_str)
        .unwrap_or_default();
    let schema = session.catalog.get(name)?;
    let params = util::collect_parameters(&schema, matches)?;

    let mut found = violations(&schema, &params);
    if found.is_empty() {
        let output_dir = matches.get_one::<PathBuf>("output-dir");
        if let Err(err) = resolve_templates(&schema, &params, output_dir.map(PathBuf::as_path)) {
            found.push(err);
        }
    }

    Ok(CommandResult::Validation {
        task: schema.name().to_string(),
        valid: found.is_empty(),
        violations: found.iter().map(Violation::from).collect(),
    })
}

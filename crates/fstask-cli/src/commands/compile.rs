use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};
use fstask::{CompileOptions, ProcessEnv, ReportMode, compile_resolved, derive_outputs, prepare};

use crate::commands::{CommandResult, with_invocation_args};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    with_invocation_args(
        Command::new("compile").about("Compile bound parameters into a command line"),
    )
    .arg(
        Arg::new("all-errors")
            .long("all-errors")
            .action(ArgAction::SetTrue)
            .help("Report every violation instead of stopping at the first"),
    )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let name = matches
        .get_one::<String>("task")
        .map(String::as_str)
        .unwrap_or_default();
    let schema = session.catalog.get(name)?;
    let params = util::collect_parameters(&schema, matches)?;

    let options = CompileOptions {
        report: if matches.get_flag("all-errors") {
            ReportMode::AllErrors
        } else {
            ReportMode::FirstError
        },
        output_dir: matches.get_one::<PathBuf>("output-dir").cloned(),
    };

    let resolved = prepare(&schema, &params, &options)?;
    let invocation = compile_resolved(&schema, &resolved)?;
    let derived_outputs = derive_outputs(&schema, &resolved, &ProcessEnv);
    tracing::debug!(task = name, derived = derived_outputs.len(), "compiled task");

    Ok(CommandResult::Compiled {
        command_line: invocation.command_line(),
        invocation,
        derived_outputs,
    })
}

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "fstask";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments, assembles the task catalog, and dispatches to the
/// selected command. Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let catalog_dir = matches.get_one::<PathBuf>("catalog").cloned();
    let session = CliSession::bootstrap(catalog_dir, verbosity)?;
    if session.verbosity.verbose {
        tracing::info!(
            catalog = %session.catalog_source(),
            tasks = session.catalog.len(),
            "resolved task catalog"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Root command tree: global flags plus `tasks`, `describe`, `compile`,
/// `validate` and `schema`.
fn build_cli() -> Command {
    Command::new(NAME)
        .about("Compile FreeSurfer task invocations into command lines")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("DIR")
                .env("FSTASK_CATALOG")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("Directory of YAML or JSON task definitions added on top of the built-in tasks."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log where the task catalog was loaded from."),
        )
        .subcommand_required(true)
        .subcommand(commands::tasks::command())
        .subcommand(commands::describe::command())
        .subcommand(commands::compile::command())
        .subcommand(commands::validate::command())
        .subcommand(commands::schema::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("tasks", sub)) => commands::tasks::run(session, sub),
        Some(("describe", sub)) => commands::describe::run(session, sub),
        Some(("compile", sub)) => commands::compile::run(session, sub),
        Some(("validate", sub)) => commands::validate::run(session, sub),
        Some(("schema", sub)) => commands::schema::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}

use clap::{Arg, ArgMatches, Command};
use fstask::TaskDefinition;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("describe")
        .about("Show the parameters and outputs of a task")
        .arg(Arg::new("task").required(true).value_name("TASK"))
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let name = matches
        .get_one::<String>("task")
        .map(String::as_str)
        .unwrap_or_default();
    let schema = session.catalog.get(name)?;
    Ok(CommandResult::TaskDescription {
        task: TaskDefinition::from(schema.as_ref()),
    })
}

use clap::{ArgMatches, Command};
use fstask::definition_json_schema;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("schema").about("Print the JSON Schema for task definition files")
}

pub fn run(_session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let schema = serde_json::to_value(definition_json_schema())?;
    Ok(CommandResult::DefinitionSchema { schema })
}

use clap::{ArgMatches, Command};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

#[derive(Clone, Debug, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub executable: String,
    pub description: String,
    pub parameters: usize,
}

pub fn command() -> Command {
    Command::new("tasks").about("List the available tasks")
}

pub fn run(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let tasks = session
        .catalog
        .tasks()
        .map(|schema| TaskSummary {
            name: schema.name().to_string(),
            executable: schema.executable().to_string(),
            description: schema.description().to_string(),
            parameters: schema.parameters().len(),
        })
        .collect();
    Ok(CommandResult::TaskList { tasks })
}

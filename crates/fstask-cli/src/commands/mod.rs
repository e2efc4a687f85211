use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use fstask::{CompiledInvocation, TaskDefinition};
use serde::Serialize;

use crate::error::ExitStatus;

pub mod compile;
pub mod describe;
pub mod schema;
pub mod tasks;
pub mod validate;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    TaskList {
        tasks: Vec<tasks::TaskSummary>,
    },
    TaskDescription {
        task: TaskDefinition,
    },
    Compiled {
        invocation: CompiledInvocation,
        command_line: String,
        derived_outputs: BTreeMap<String, String>,
    },
    Validation {
        task: String,
        valid: bool,
        violations: Vec<validate::Violation>,
    },
    DefinitionSchema {
        schema: serde_json::Value,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Validation { valid, .. } => {
                if *valid {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}

/// Arguments shared by commands that bind parameters for one task.
fn with_invocation_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("task")
                .required(true)
                .value_name("TASK")
                .help("Task name, as listed by `fstask tasks`"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .short('s')
                .value_name("NAME=VALUE")
                .action(ArgAction::Append)
                .help("Bind a parameter; lists and tuples are comma-separated"),
        )
        .arg(
            Arg::new("params")
                .long("params")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("YAML or JSON map of parameter bindings; --set takes precedence"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Place relative templated outputs in this directory"),
        )
}

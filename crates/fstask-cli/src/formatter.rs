use std::process::ExitCode;

use fstask::{ParameterDef, TaskDefinition};

use crate::commands::CommandResult;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as human-readable text or one line of JSON and
/// converts the outcome into an exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result)?,
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) -> Result<(), CliError> {
    match result {
        CommandResult::TaskList { tasks } => {
            println!("Tasks ({}):", tasks.len());
            let width = tasks.iter().map(|task| task.name.len()).max().unwrap_or(0);
            for task in tasks {
                println!("  {:<width$}  {}", task.name, task.description);
            }
        }
        CommandResult::TaskDescription { task } => print_description(task),
        CommandResult::Compiled { command_line, .. } => {
            println!("{command_line}");
        }
        CommandResult::Validation {
            task,
            valid,
            violations,
        } => {
            if *valid {
                println!("{task}: OK");
            } else {
                println!("{task}: {} violation(s)", violations.len());
                for violation in violations {
                    println!("  [{}] {}", violation.kind, violation.message);
                }
            }
        }
        CommandResult::DefinitionSchema { schema } => {
            println!("{}", serde_json::to_string_pretty(schema)?);
        }
    }
    Ok(())
}

fn print_description(task: &TaskDefinition) {
    println!("{} ({})", task.name, task.executable);
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
    println!("Parameters ({}):", task.parameters.len());
    for param in &task.parameters {
        println!("  {} <{}>{}", param.name, param.semantic_type, parameter_traits(param));
        if !param.help.is_empty() {
            println!("      {}", param.help);
        }
    }
    if !task.derived_outputs.is_empty() {
        println!("Derived outputs:");
        for output in &task.derived_outputs {
            println!("  {}  {}", output.name, output.help);
        }
    }
}

fn parameter_traits(param: &ParameterDef) -> String {
    let mut traits = Vec::new();
    if param.mandatory {
        traits.push("mandatory".to_string());
    }
    match &param.argstr {
        Some(argstr) if argstr.is_empty() => traits.push("positional".to_string()),
        Some(argstr) => traits.push(format!("argstr={argstr}")),
        None => {}
    }
    if let Some(position) = param.position {
        traits.push(format!("position={position}"));
    }
    if let Some(allowed) = &param.allowed_values {
        let values: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        traits.push(format!("one of [{}]", values.join(", ")));
    }
    if let Some(default) = &param.default {
        traits.push(format!("default={default}"));
    }
    if !param.xor.is_empty() {
        traits.push(format!("xor [{}]", param.xor.join(", ")));
    }
    if !param.requires.is_empty() {
        traits.push(format!("requires [{}]", param.requires.join(", ")));
    }
    if let Some(template) = &param.output_file_template {
        traits.push(format!("template={template}"));
    }
    if param.output {
        traits.push("output".to_string());
    }
    if param.readonly {
        traits.push("computed".to_string());
    }
    if traits.is_empty() {
        String::new()
    } else {
        format!("  {}", traits.join("  "))
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    println!("{}", serde_json::to_string(result)?);
    Ok(())
}

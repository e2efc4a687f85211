use std::fs;
use std::path::Path;

use clap::ArgMatches;
use fstask::{FstaskError, InvocationError, ParamValue, ParameterSet, TaskSchema};

use crate::error::{CliError, ExitStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

/// Splits `name=value`; the value may be empty or contain further `=`.
pub fn parse_assignment(raw: &str) -> Result<(&str, &str), CliError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(CliError::new(
            format!("expected name=value, got '{raw}'"),
            ExitStatus::Usage,
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::new(
            format!("parameter name must not be empty in '{raw}'"),
            ExitStatus::Usage,
        ));
    }
    Ok((name, value))
}

/// Parses a `--set` value using the declared type. Undeclared names stay
/// text so validation reports them as unknown.
pub fn typed_value(schema: &TaskSchema, name: &str, raw: &str) -> Result<ParamValue, CliError> {
    match schema.parameter(name) {
        Some(spec) => ParamValue::parse_as(raw, &spec.semantic_type).map_err(|reason| {
            FstaskError::Invocation(InvocationError::invalid(name, reason)).into()
        }),
        None => Ok(ParamValue::from(raw)),
    }
}

pub fn read_params_file(path: &Path) -> Result<ParameterSet, CliError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        CliError::new(format!("{}: {err}", path.display()), ExitStatus::Io)
    })?;
    serde_yaml::from_str(&raw).map_err(|err| {
        CliError::new(format!("{}: {err}", path.display()), ExitStatus::Data)
    })
}

/// Bindings from `--params` overlaid with every `--set`.
pub fn collect_parameters(
    schema: &TaskSchema,
    matches: &ArgMatches,
) -> Result<ParameterSet, CliError> {
    let mut params = match matches.get_one::<std::path::PathBuf>("params") {
        Some(path) => read_params_file(path)?,
        None => ParameterSet::new(),
    };

    if let Some(assignments) = matches.get_many::<String>("set") {
        for raw in assignments {
            let (name, value) = parse_assignment(raw)?;
            params.insert(name, typed_value(schema, name, value)?);
        }
    }
    Ok(params)
}

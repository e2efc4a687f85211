use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{FstaskError, InvocationError};
use crate::outputs::extract_outputs;
use crate::parameter::{ArgTemplate, ParameterSpec};
use crate::params::ParameterSet;
use crate::schema::TaskSchema;
use crate::template::{resolve_templates, substitute};
use crate::validation::{ReportMode, validate};
use crate::value::ParamValue;

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    pub report: ReportMode,
    /// Directory receiving relative templated outputs, by file name.
    pub output_dir: Option<PathBuf>,
}

/// Ready-to-run command: full argv plus the output paths to check afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompiledInvocation {
    pub task: String,
    pub executable: String,
    /// Executable prefix tokens followed by the compiled parameter tokens.
    pub tokens: Vec<String>,
    pub declared_outputs: BTreeMap<String, String>,
}

impl CompiledInvocation {
    pub fn program(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    /// `argv[1..]` for the subprocess.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Display form; tokens that would not survive word splitting are quoted.
    pub fn command_line(&self) -> String {
        self.tokens
            .iter()
            .map(|token| quote(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(token: &str) -> String {
    let plain = !token.is_empty()
        && !token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\' | ';' | '&' | '|'));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Validates `params` and resolves templates and defaults into a working copy.
pub fn prepare(
    schema: &TaskSchema,
    params: &ParameterSet,
    options: &CompileOptions,
) -> Result<ParameterSet, FstaskError> {
    validate(schema, params, options.report)?;
    let resolved = resolve_templates(schema, params, options.output_dir.as_deref())?;
    Ok(resolved)
}

/// Validates, resolves and compiles in one step. Nothing is produced on failure.
pub fn compile(
    schema: &TaskSchema,
    params: &ParameterSet,
    options: &CompileOptions,
) -> Result<CompiledInvocation, FstaskError> {
    let resolved = prepare(schema, params, options)?;
    compile_resolved(schema, &resolved)
}

/// Compiles an already validated and resolved parameter set.
pub fn compile_resolved(
    schema: &TaskSchema,
    resolved: &ParameterSet,
) -> Result<CompiledInvocation, FstaskError> {
    let tokens = compile_tokens(schema, resolved)?;
    let declared_outputs = extract_outputs(schema, resolved);
    tracing::debug!(
        task = schema.name(),
        tokens = tokens.len(),
        outputs = declared_outputs.len(),
        "compiled invocation"
    );
    Ok(CompiledInvocation {
        task: schema.name().to_string(),
        executable: schema.executable().to_string(),
        tokens,
        declared_outputs,
    })
}

/// Lays out parameter contributions after the executable prefix: positive
/// positions first, then unpositioned parameters in declaration order, then
/// negative positions counted back from the end.
pub fn compile_tokens(
    schema: &TaskSchema,
    resolved: &ParameterSet,
) -> Result<Vec<String>, InvocationError> {
    let mut leading: Vec<(i32, Vec<String>)> = Vec::new();
    let mut unpositioned: Vec<String> = Vec::new();
    let mut trailing: Vec<(i32, Vec<String>)> = Vec::new();

    for spec in schema.parameters() {
        let tokens = contribution(spec, resolved)?;
        if tokens.is_empty() {
            continue;
        }
        match spec.position {
            Some(position) if position > 0 => leading.push((position, tokens)),
            Some(position) => trailing.push((position, tokens)),
            None => unpositioned.extend(tokens),
        }
    }

    leading.sort_by_key(|(position, _)| *position);
    trailing.sort_by_key(|(position, _)| *position);

    let mut argv = schema.executable_tokens();
    argv.extend(leading.into_iter().flat_map(|(_, tokens)| tokens));
    argv.extend(unpositioned);
    argv.extend(trailing.into_iter().flat_map(|(_, tokens)| tokens));
    Ok(argv)
}

fn contribution(
    spec: &ParameterSpec,
    resolved: &ParameterSet,
) -> Result<Vec<String>, InvocationError> {
    if let Some(formatter) = &spec.formatter {
        return formatter.render(&spec.name, resolved);
    }

    let Some(value) = resolved.get(&spec.name) else {
        return Ok(Vec::new());
    };

    if let ParamValue::Bool(enabled) = value {
        return match (&spec.arg, enabled) {
            (_, false) | (ArgTemplate::Suppressed, _) => Ok(Vec::new()),
            (ArgTemplate::Flag(flag), true) => Ok(vec![flag.clone()]),
            (ArgTemplate::Pattern(pattern), true) => {
                render_pattern(pattern, spec, value, resolved)
            }
            (ArgTemplate::Positional, true) => Ok(value.tokens()),
        };
    }

    let tokens = match &spec.arg {
        ArgTemplate::Suppressed => Vec::new(),
        ArgTemplate::Positional => value.tokens(),
        ArgTemplate::Flag(flag) => match value {
            ParamValue::List(items) if items.is_empty() => Vec::new(),
            ParamValue::List(items) if spec.repeat => items
                .iter()
                .flat_map(|item| std::iter::once(flag.clone()).chain(item.tokens()))
                .collect(),
            other => std::iter::once(flag.clone()).chain(other.tokens()).collect(),
        },
        ArgTemplate::Pattern(pattern) => match value {
            ParamValue::List(items) if spec.repeat => {
                let mut tokens = Vec::new();
                for item in items {
                    tokens.extend(render_pattern(pattern, spec, item, resolved)?);
                }
                tokens
            }
            other => render_pattern(pattern, spec, other, resolved)?,
        },
    };
    Ok(tokens)
}

/// One token per whitespace-separated piece of the pattern. `{own}` refers
/// to `own_value`; other placeholders read resolved parameters.
fn render_pattern(
    pattern: &str,
    spec: &ParameterSpec,
    own_value: &ParamValue,
    resolved: &ParameterSet,
) -> Result<Vec<String>, InvocationError> {
    pattern
        .split_whitespace()
        .map(|piece| {
            substitute(piece, |name| {
                if name == spec.name {
                    Some(own_value.to_string())
                } else {
                    resolved.get(name).map(ToString::to_string)
                }
            })
            .map_err(|missing| InvocationError::TemplateSubstitutionError {
                parameter: spec.name.clone(),
                missing,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Formatter;
    use crate::value::SemanticType;

    fn convert_schema() -> TaskSchema {
        TaskSchema::builder("convert", "mri_convert")
            .param(
                ParameterSpec::new("input_volume", SemanticType::Path)
                    .argstr("")
                    .mandatory()
                    .position(-2),
            )
            .param(
                ParameterSpec::new("output_volume", SemanticType::Path)
                    .argstr("")
                    .position(-1)
                    .output_template("{input_volume}_converted.nii.gz"),
            )
            .param(
                ParameterSpec::new("output_data_type", SemanticType::String)
                    .argstr("-odt {output_data_type}"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn unpositioned_flags_precede_trailing_positionals() {
        let params = ParameterSet::new()
            .with("input_volume", "orig.nii.gz")
            .with("output_data_type", "float");
        let invocation = compile(&convert_schema(), &params, &CompileOptions::default()).unwrap();
        assert_eq!(
            invocation.tokens,
            vec![
                "mri_convert",
                "-odt",
                "float",
                "orig.nii.gz",
                "orig.nii.gz_converted.nii.gz"
            ]
        );
        assert_eq!(invocation.program(), "mri_convert");
        assert_eq!(invocation.args().len(), 4);
        assert_eq!(
            invocation.declared_outputs.get("output_volume").map(String::as_str),
            Some("orig.nii.gz_converted.nii.gz")
        );
    }

    #[test]
    fn failed_validation_produces_no_tokens() {
        let params = ParameterSet::new().with("output_data_type", "float");
        let err = compile(&convert_schema(), &params, &CompileOptions::default()).unwrap_err();
        assert_eq!(
            err.violations(),
            vec![InvocationError::MissingMandatoryParameter {
                name: "input_volume".into()
            }]
        );
    }

    #[test]
    fn boolean_flags_appear_only_when_true() {
        let schema = TaskSchema::builder("demo", "demo")
            .param(ParameterSpec::new("deface", SemanticType::Boolean).argstr("-deface"))
            .build()
            .unwrap();
        let on = ParameterSet::new().with("deface", true);
        let off = ParameterSet::new().with("deface", false);
        assert_eq!(compile_tokens(&schema, &on).unwrap(), vec!["demo", "-deface"]);
        assert_eq!(compile_tokens(&schema, &off).unwrap(), vec!["demo"]);
        assert_eq!(compile_tokens(&schema, &ParameterSet::new()).unwrap(), vec!["demo"]);
    }

    #[test]
    fn repeat_marker_repeats_the_flag_per_element() {
        let schema = TaskSchema::builder("demo", "demo")
            .param(ParameterSpec::new("labels", SemanticType::PathList).argstr("--label ..."))
            .param(ParameterSpec::new("movs", SemanticType::PathList).argstr("--mov"))
            .build()
            .unwrap();
        let params = ParameterSet::new()
            .with("labels", vec!["a.label", "b.label"])
            .with("movs", vec!["tp1.mgz", "tp2.mgz"]);
        assert_eq!(
            compile_tokens(&schema, &params).unwrap(),
            vec![
                "demo", "--label", "a.label", "--label", "b.label", "--mov", "tp1.mgz",
                "tp2.mgz"
            ]
        );
    }

    #[test]
    fn patterns_may_read_sibling_parameters() {
        let schema = TaskSchema::builder("demo", "recon-all")
            .param(
                ParameterSpec::new("timepoint", SemanticType::String)
                    .argstr("-long {timepoint} {template}"),
            )
            .param(ParameterSpec::new("template", SemanticType::String))
            .build()
            .unwrap();
        let params = ParameterSet::new()
            .with("timepoint", "tp1")
            .with("template", "longbase");
        assert_eq!(
            compile_tokens(&schema, &params).unwrap(),
            vec!["recon-all", "-long", "tp1", "longbase"]
        );

        let missing = ParameterSet::new().with("timepoint", "tp1");
        assert_eq!(
            compile_tokens(&schema, &missing).unwrap_err(),
            InvocationError::TemplateSubstitutionError {
                parameter: "timepoint".into(),
                missing: "template".into()
            }
        );
    }

    #[test]
    fn positive_positions_lead_and_negative_positions_trail() {
        let schema = TaskSchema::builder("demo", "demo")
            .param(ParameterSpec::new("last", SemanticType::String).argstr("").position(-1))
            .param(ParameterSpec::new("flag", SemanticType::String).argstr("-f"))
            .param(ParameterSpec::new("second", SemanticType::String).argstr("").position(2))
            .param(ParameterSpec::new("penultimate", SemanticType::String).argstr("").position(-2))
            .param(ParameterSpec::new("first", SemanticType::String).argstr("").position(1))
            .build()
            .unwrap();
        let params: ParameterSet = [
            ("last", "z"),
            ("flag", "x"),
            ("second", "b"),
            ("penultimate", "y"),
            ("first", "a"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            compile_tokens(&schema, &params).unwrap(),
            vec!["demo", "a", "b", "-f", "x", "y", "z"]
        );
    }

    #[test]
    fn formatter_overrides_argstr_even_when_unbound() {
        let schema = TaskSchema::builder("demo", "mri_robust_register")
            .param(
                ParameterSpec::new("saturation", SemanticType::Number)
                    .argstr("--ignored")
                    .formatter(Formatter::ValueOrFlag {
                        flag: "--sat".into(),
                        fallback: "--satit".into(),
                    }),
            )
            .build()
            .unwrap();
        assert_eq!(
            compile_tokens(&schema, &ParameterSet::new()).unwrap(),
            vec!["mri_robust_register", "--satit"]
        );
    }

    #[test]
    fn compilation_is_deterministic() {
        let params = ParameterSet::new()
            .with("input_volume", "orig.nii.gz")
            .with("output_data_type", "float");
        let schema = convert_schema();
        let first = compile(&schema, &params, &CompileOptions::default()).unwrap();
        let second = compile(&schema, &params, &CompileOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn command_line_quotes_tokens_with_spaces() {
        let invocation = CompiledInvocation {
            task: "demo".into(),
            executable: "demo".into(),
            tokens: vec!["demo".into(), "--i".into(), "my scan.nii".into(), "".into()],
            declared_outputs: BTreeMap::new(),
        };
        assert_eq!(invocation.command_line(), "demo --i 'my scan.nii' ''");
    }
}

//! Task definitions read from YAML or JSON files.
//!
//! A definition mirrors the attributes of the built-in catalog so users can
//! add tools, or replace a built-in task, without rebuilding the crate.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FstaskError;
use crate::fragments;
use crate::parameter::{ArgTemplate, Formatter, ParameterSpec};
use crate::schema::{DerivedOutput, TaskSchema};
use crate::value::{ParamValue, SemanticType};

/// On-disk form of a [`TaskSchema`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    pub name: String,
    /// Executable, optionally followed by fixed flags.
    pub executable: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Shared parameter groups appended after `parameters`: `subjects_dir`, `hemisphere`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_outputs: Vec<DerivedOutput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ParameterDef {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mandatory: bool,
    /// `--flag`, `""` for a bare value, `-{name}` patterns, trailing `...` to repeat.
    /// Omitted means the value never reaches the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argstr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<ParamValue>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xor: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_template: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub keep_extension: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<Formatter>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<ParameterDef> for ParameterSpec {
    fn from(def: ParameterDef) -> Self {
        let (arg, repeat) = ArgTemplate::parse(def.argstr.as_deref());
        ParameterSpec {
            name: def.name,
            semantic_type: def.semantic_type,
            help: def.help,
            mandatory: def.mandatory,
            arg,
            repeat,
            position: def.position,
            allowed_values: def.allowed_values,
            xor: def.xor,
            requires: def.requires,
            output_template: def.output_file_template,
            keep_extension: def.keep_extension,
            output: def.output,
            default: def.default,
            formatter: def.formatter,
            readonly: def.readonly,
        }
    }
}

impl From<&ParameterSpec> for ParameterDef {
    fn from(spec: &ParameterSpec) -> Self {
        ParameterDef {
            name: spec.name.clone(),
            semantic_type: spec.semantic_type.clone(),
            help: spec.help.clone(),
            mandatory: spec.mandatory,
            argstr: spec.arg.to_argstr(spec.repeat),
            position: spec.position,
            allowed_values: spec.allowed_values.clone(),
            xor: spec.xor.clone(),
            requires: spec.requires.clone(),
            output_file_template: spec.output_template.clone(),
            keep_extension: spec.keep_extension,
            output: spec.output,
            default: spec.default.clone(),
            formatter: spec.formatter.clone(),
            readonly: spec.readonly,
        }
    }
}

impl TryFrom<TaskDefinition> for TaskSchema {
    type Error = FstaskError;

    fn try_from(def: TaskDefinition) -> Result<Self, Self::Error> {
        let mut builder = TaskSchema::builder(def.name.as_str(), def.executable)
            .describe(def.description)
            .fragment(def.parameters.into_iter().map(ParameterSpec::from));

        for fragment in &def.include {
            let specs = fragments::by_name(fragment).ok_or_else(|| {
                FstaskError::Schema(format!("unknown include '{fragment}'")).context(&def.name)
            })?;
            builder = builder.fragment(specs);
        }
        for output in def.derived_outputs {
            builder = builder.derived(output);
        }
        builder.build()
    }
}

impl From<&TaskSchema> for TaskDefinition {
    fn from(schema: &TaskSchema) -> Self {
        TaskDefinition {
            name: schema.name().to_string(),
            executable: schema.executable().to_string(),
            description: schema.description().to_string(),
            include: Vec::new(),
            parameters: schema.parameters().iter().map(ParameterDef::from).collect(),
            derived_outputs: schema.derived_outputs().to_vec(),
        }
    }
}

impl TaskDefinition {
    /// Parses YAML; JSON documents are accepted as well.
    pub fn from_yaml_str(raw: &str) -> Result<Self, FstaskError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, FstaskError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw).map_err(|err| err.context(path.display()))
    }

    pub fn into_schema(self) -> Result<TaskSchema, FstaskError> {
        TaskSchema::try_from(self)
    }
}

/// Reads and validates a definition file.
pub fn load_definition(path: &Path) -> Result<TaskSchema, FstaskError> {
    let schema = TaskDefinition::from_path(path)?
        .into_schema()
        .map_err(|err| err.context(path.display()))?;
    tracing::debug!(task = schema.name(), path = %path.display(), "loaded task definition");
    Ok(schema)
}

/// JSON Schema describing definition files.
pub fn definition_json_schema() -> schemars::Schema {
    schemars::schema_for!(TaskDefinition)
}

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FstaskError;
use crate::parameter::ParameterSpec;
use crate::template::placeholders;

/// How a derived output value is obtained once the invocation is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedKind {
    /// The bound parameter, else the `SUBJECTS_DIR` environment variable.
    SubjectsDir { parameter: String },
    /// A `{name}` pattern over resolved parameters.
    Template { template: String },
}

/// Output computed after compilation rather than bound to a parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DerivedOutput {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(flatten)]
    pub kind: DerivedKind,
}

impl DerivedOutput {
    pub fn template(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            kind: DerivedKind::Template {
                template: template.into(),
            },
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// Full declaration of one external command: executable plus ordered parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSchema {
    name: String,
    executable: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    derived: Vec<DerivedOutput>,
}

impl TaskSchema {
    pub fn builder(name: impl Into<String>, executable: impl Into<String>) -> TaskSchemaBuilder {
        TaskSchemaBuilder {
            name: name.into(),
            executable: executable.into(),
            description: String::new(),
            parameters: Vec::new(),
            derived: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executable prefix, possibly with baked-in flags (`tkregister2 --noedit`).
    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn derived_outputs(&self) -> &[DerivedOutput] {
        &self.derived
    }

    /// Executable prefix split into tokens; never reordered by compilation.
    pub fn executable_tokens(&self) -> Vec<String> {
        self.executable
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

pub struct TaskSchemaBuilder {
    name: String,
    executable: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    derived: Vec<DerivedOutput>,
}

impl TaskSchemaBuilder {
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Appends a reusable group of parameters after the ones declared so far.
    pub fn fragment(mut self, specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(specs);
        self
    }

    pub fn derived(mut self, output: DerivedOutput) -> Self {
        self.derived.push(output);
        self
    }

    pub fn build(self) -> Result<TaskSchema, FstaskError> {
        let schema = TaskSchema {
            name: self.name,
            executable: self.executable,
            description: self.description,
            parameters: self.parameters,
            derived: self.derived,
        };

        let problems = structural_problems(&schema);
        if problems.is_empty() {
            Ok(schema)
        } else {
            Err(FstaskError::Schema(problems.join("; ")).context(&schema.name))
        }
    }
}

fn structural_problems(schema: &TaskSchema) -> Vec<String> {
    let mut problems = Vec::new();

    if schema.executable.trim().is_empty() {
        problems.push("executable must not be empty".to_string());
    }

    let mut seen = HashSet::new();
    for spec in &schema.parameters {
        if !seen.insert(spec.name.as_str()) {
            problems.push(format!("duplicate parameter '{}'", spec.name));
        }
    }

    let mut positions: BTreeMap<i32, &str> = BTreeMap::new();
    for spec in &schema.parameters {
        for reference in spec.references() {
            if !seen.contains(reference) {
                problems.push(format!(
                    "parameter '{}' references unknown parameter '{reference}'",
                    spec.name
                ));
            }
        }

        if let Some(position) = spec.position {
            if position == 0 {
                problems.push(format!("parameter '{}' has position 0", spec.name));
            } else if let Some(other) = positions.insert(position, &spec.name) {
                problems.push(format!(
                    "parameters '{other}' and '{}' share position {position}",
                    spec.name
                ));
            }
        }

        if spec.mandatory && spec.is_templated() {
            problems.push(format!(
                "parameter '{}' cannot be both mandatory and templated",
                spec.name
            ));
        }
        if spec.mandatory && spec.readonly {
            problems.push(format!(
                "parameter '{}' cannot be both mandatory and readonly",
                spec.name
            ));
        }

        if let Some(allowed) = &spec.allowed_values {
            for value in allowed {
                if !value.matches(&spec.semantic_type) {
                    problems.push(format!(
                        "allowed value '{value}' of '{}' is not a {}",
                        spec.name, spec.semantic_type
                    ));
                }
            }
        }

        if let Some(default) = &spec.default {
            if !default.matches(&spec.semantic_type) {
                problems.push(format!(
                    "default '{default}' of '{}' is not a {}",
                    spec.name, spec.semantic_type
                ));
            }
            if let Some(allowed) = &spec.allowed_values {
                if !allowed.iter().any(|v| v.same_as(default)) {
                    problems.push(format!(
                        "default '{default}' of '{}' is not an allowed value",
                        spec.name
                    ));
                }
            }
        }
    }

    for output in &schema.derived {
        let referenced: Vec<&str> = match &output.kind {
            DerivedKind::SubjectsDir { parameter } => vec![parameter.as_str()],
            DerivedKind::Template { template } => placeholders(template).collect(),
        };
        for reference in referenced {
            if !seen.contains(reference) {
                problems.push(format!(
                    "derived output '{}' references unknown parameter '{reference}'",
                    output.name
                ));
            }
        }
    }

    problems
}

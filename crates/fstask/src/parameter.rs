use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::InvocationError;
use crate::params::ParameterSet;
use crate::template::placeholders;
use crate::value::{ParamValue, SemanticType};

const REPEAT_MARKER: &str = "...";

/// How a bound value is written onto the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgTemplate {
    /// Never emitted; the value only feeds templates, formatters or outputs.
    Suppressed,
    /// Bare value token(s), no flag.
    Positional,
    /// Flag token followed by the value, or the flag alone for booleans.
    Flag(String),
    /// Whitespace-separated pieces with `{name}` placeholders.
    Pattern(String),
}

impl ArgTemplate {
    /// Parses an argstr such as `--mov`, `-{directive}`, `--label ...` or `""`.
    /// Returns the template plus whether the repeat marker was present.
    pub fn parse(argstr: Option<&str>) -> (ArgTemplate, bool) {
        let Some(raw) = argstr else {
            return (ArgTemplate::Suppressed, false);
        };
        let trimmed = raw.trim();
        let (body, repeat) = match trimmed.strip_suffix(REPEAT_MARKER) {
            Some(rest) => (rest.trim_end(), true),
            None => (trimmed, false),
        };

        let template = if body.is_empty() {
            ArgTemplate::Positional
        } else if placeholders(body).next().is_some() {
            ArgTemplate::Pattern(body.to_string())
        } else {
            ArgTemplate::Flag(body.to_string())
        };
        (template, repeat)
    }

    /// Inverse of [`ArgTemplate::parse`].
    pub fn to_argstr(&self, repeat: bool) -> Option<String> {
        let body = match self {
            ArgTemplate::Suppressed => return None,
            ArgTemplate::Positional => String::new(),
            ArgTemplate::Flag(text) | ArgTemplate::Pattern(text) => text.clone(),
        };
        Some(match (repeat, body.is_empty()) {
            (false, _) => body,
            (true, true) => REPEAT_MARKER.to_string(),
            (true, false) => format!("{body} {REPEAT_MARKER}"),
        })
    }

    pub fn placeholders(&self) -> Vec<&str> {
        match self {
            ArgTemplate::Pattern(text) => placeholders(text).collect(),
            _ => Vec::new(),
        }
    }
}

/// Contribution computed from parameter values instead of the argstr.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formatter {
    /// Boolean switch with distinct on/off flags; nothing when unbound.
    Toggle { on: String, off: String },
    /// `[flag, value]` for a truthy value, otherwise `[fallback]`.
    ValueOrFlag { flag: String, fallback: String },
    /// Bound value selects a token list; unbound or unmatched values emit nothing.
    Lookup { table: BTreeMap<String, Vec<String>> },
    /// `[flag, n]` where `n` is the length of the `source` sequence.
    Count { flag: String, source: String },
}

impl Formatter {
    pub fn lookup<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Formatter::Lookup {
            table: entries
                .into_iter()
                .map(|(key, tokens)| (key.into(), tokens.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Parameters whose values the formatter reads.
    pub fn dependencies<'a>(&'a self, own: &'a str) -> Vec<&'a str> {
        match self {
            Formatter::Count { source, .. } => vec![source.as_str()],
            _ => vec![own],
        }
    }

    pub fn render(
        &self,
        own: &str,
        values: &ParameterSet,
    ) -> Result<Vec<String>, InvocationError> {
        let value = values.get(own);
        let tokens = match self {
            Formatter::Toggle { on, off } => match value {
                None => Vec::new(),
                Some(ParamValue::Bool(true)) => vec![on.clone()],
                Some(ParamValue::Bool(false)) => vec![off.clone()],
                Some(other) => {
                    return Err(InvocationError::invalid(
                        own,
                        format!("expected a boolean, got '{other}'"),
                    ));
                }
            },
            Formatter::ValueOrFlag { flag, fallback } => match value {
                Some(v) if v.is_truthy() => {
                    let mut tokens = vec![flag.clone()];
                    tokens.extend(v.tokens());
                    tokens
                }
                _ => vec![fallback.clone()],
            },
            Formatter::Lookup { table } => value
                .and_then(|v| table.get(&v.to_string()))
                .cloned()
                .unwrap_or_default(),
            Formatter::Count { flag, source } => match values.get(source) {
                Some(ParamValue::List(items)) => vec![flag.clone(), items.len().to_string()],
                Some(other) => {
                    return Err(InvocationError::invalid(
                        source.as_str(),
                        format!("expected a sequence to count, got '{other}'"),
                    ));
                }
                None => Vec::new(),
            },
        };
        Ok(tokens)
    }
}

/// Describes one accepted parameter of a task.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub semantic_type: SemanticType,
    pub help: String,
    pub mandatory: bool,
    pub arg: ArgTemplate,
    pub repeat: bool,
    pub position: Option<i32>,
    pub allowed_values: Option<Vec<ParamValue>>,
    pub xor: Vec<String>,
    pub requires: Vec<String>,
    pub output_template: Option<String>,
    pub keep_extension: bool,
    pub output: bool,
    pub default: Option<ParamValue>,
    pub formatter: Option<Formatter>,
    pub readonly: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            help: String::new(),
            mandatory: false,
            arg: ArgTemplate::Suppressed,
            repeat: false,
            position: None,
            allowed_values: None,
            xor: Vec::new(),
            requires: Vec::new(),
            output_template: None,
            keep_extension: true,
            output: false,
            default: None,
            formatter: None,
            readonly: false,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn argstr(mut self, argstr: &str) -> Self {
        let (arg, repeat) = ArgTemplate::parse(Some(argstr));
        self.arg = arg;
        self.repeat = repeat;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn allowed<V: Into<ParamValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn xor(mut self, names: &[&str]) -> Self {
        self.xor = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn requires(mut self, names: &[&str]) -> Self {
        self.requires = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }

    pub fn keep_extension(mut self, keep: bool) -> Self {
        self.keep_extension = keep;
        self
    }

    pub fn output(mut self) -> Self {
        self.output = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn is_templated(&self) -> bool {
        self.output_template.is_some()
    }

    pub fn is_output(&self) -> bool {
        self.output || self.is_templated()
    }

    /// Every other parameter this one names, for structural checks.
    pub fn references(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .xor
            .iter()
            .chain(&self.requires)
            .map(String::as_str)
            .collect();
        names.extend(self.arg.placeholders());
        if let Some(template) = &self.output_template {
            names.extend(placeholders(template));
        }
        if let Some(formatter) = &self.formatter {
            names.extend(formatter.dependencies(&self.name));
        }
        names.retain(|name| *name != self.name);
        names
    }
}

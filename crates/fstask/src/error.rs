use std::fmt;

use thiserror::Error;

/// Violations detected while checking or compiling a single invocation.
///
/// Every variant names the parameter(s) involved so callers can point the
/// user at the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("missing mandatory parameter '{name}'")]
    MissingMandatoryParameter { name: String },
    #[error("parameters '{first}' and '{second}' are mutually exclusive")]
    MutuallyExclusiveViolation { first: String, second: String },
    #[error("parameter '{name}' requires '{required}' to be set")]
    MissingDependency { name: String, required: String },
    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("output templates form a cycle: {}", .parameters.join(" -> "))]
    TemplateCycle { parameters: Vec<String> },
    #[error("cannot render '{parameter}': template references unset parameter '{missing}'")]
    TemplateSubstitutionError { parameter: String, missing: String },
    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },
}

impl InvocationError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case tag used in machine-readable reports.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::MissingMandatoryParameter { .. } => "missing_mandatory_parameter",
            InvocationError::MutuallyExclusiveViolation { .. } => "mutually_exclusive_violation",
            InvocationError::MissingDependency { .. } => "missing_dependency",
            InvocationError::InvalidValue { .. } => "invalid_value",
            InvocationError::TemplateCycle { .. } => "template_cycle",
            InvocationError::TemplateSubstitutionError { .. } => "template_substitution_error",
            InvocationError::UnknownParameter { .. } => "unknown_parameter",
        }
    }
}

/// High-level error type shared across fstask components.
#[derive(Debug, Error)]
pub enum FstaskError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    #[error("{} violation(s): {}", .0.len(), join_violations(.0))]
    Violations(Vec<InvocationError>),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FstaskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for FstaskError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl FstaskError {
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            FstaskError::UnknownTask(name) => FstaskError::UnknownTask(format!("{ctx}: {name}")),
            FstaskError::Schema(msg) => FstaskError::Schema(format!("{ctx}: {msg}")),
            FstaskError::Serialization(msg) => {
                FstaskError::Serialization(format!("{ctx}: {msg}"))
            }
            other => other,
        }
    }

    /// Flattens the error into the individual invocation violations it carries.
    pub fn violations(&self) -> Vec<InvocationError> {
        match self {
            FstaskError::Invocation(err) => vec![err.clone()],
            FstaskError::Violations(errs) => errs.clone(),
            _ => Vec::new(),
        }
    }
}

fn join_violations(errs: &[InvocationError]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

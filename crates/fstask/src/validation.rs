use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{FstaskError, InvocationError};
use crate::parameter::ParameterSpec;
use crate::params::ParameterSet;
use crate::schema::TaskSchema;
use crate::value::ParamValue;

/// Whether validation stops at the first violation or collects all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    #[default]
    FirstError,
    AllErrors,
}

/// Checks `params` against `schema` without side effects.
///
/// Parameters are visited in declaration order; for each one the checks run
/// as mandatory, mutual exclusion, dependencies, then value constraints.
/// Unknown names are reported before any declared parameter.
pub fn validate(
    schema: &TaskSchema,
    params: &ParameterSet,
    mode: ReportMode,
) -> Result<(), FstaskError> {
    match mode {
        ReportMode::FirstError => {
            let mut first = None;
            walk(schema, params, &mut |err| {
                first = Some(err);
                false
            });
            match first {
                Some(err) => Err(FstaskError::Invocation(err)),
                None => Ok(()),
            }
        }
        ReportMode::AllErrors => {
            let errors = violations(schema, params);
            if errors.is_empty() {
                Ok(())
            } else {
                Err(FstaskError::Violations(errors))
            }
        }
    }
}

/// Every violation, in validation order.
pub fn violations(schema: &TaskSchema, params: &ParameterSet) -> Vec<InvocationError> {
    let mut errors = Vec::new();
    walk(schema, params, &mut |err| {
        errors.push(err);
        true
    });
    errors
}

struct Bindings<'a> {
    schema: &'a TaskSchema,
    params: &'a ParameterSet,
}

impl Bindings<'_> {
    fn effective(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name).or_else(|| {
            self.schema
                .parameter(name)
                .and_then(|spec| spec.default.as_ref())
        })
    }

    fn present(&self, name: &str) -> bool {
        self.effective(name).is_some()
    }

    /// Bound to something other than `false`. Only active switches enforce their `requires`.
    fn active(&self, name: &str) -> bool {
        matches!(self.effective(name), Some(value) if value != &ParamValue::Bool(false))
    }

    /// Bound, defaulted, or produced by an output template.
    fn satisfied(&self, name: &str) -> bool {
        self.present(name)
            || self
                .schema
                .parameter(name)
                .is_some_and(ParameterSpec::is_templated)
    }
}

/// Feeds violations to `sink` until it returns `false`.
fn walk(
    schema: &TaskSchema,
    params: &ParameterSet,
    sink: &mut dyn FnMut(InvocationError) -> bool,
) {
    for name in params.names() {
        if schema.parameter(name).is_none()
            && !sink(InvocationError::UnknownParameter {
                name: name.to_string(),
            })
        {
            return;
        }
    }

    let bindings = Bindings { schema, params };
    let mut reported_pairs: BTreeSet<(String, String)> = BTreeSet::new();

    for spec in schema.parameters() {
        if spec.mandatory
            && !bindings.present(&spec.name)
            && !spec.xor.iter().any(|peer| bindings.present(peer))
            && !sink(InvocationError::MissingMandatoryParameter {
                name: spec.name.clone(),
            })
        {
            return;
        }

        if bindings.present(&spec.name) {
            for peer in &spec.xor {
                if *peer == spec.name || !bindings.present(peer) {
                    continue;
                }
                let pair = if spec.name <= *peer {
                    (spec.name.clone(), peer.clone())
                } else {
                    (peer.clone(), spec.name.clone())
                };
                if reported_pairs.insert(pair)
                    && !sink(InvocationError::MutuallyExclusiveViolation {
                        first: spec.name.clone(),
                        second: peer.clone(),
                    })
                {
                    return;
                }
            }
        }

        if bindings.active(&spec.name) {
            for required in &spec.requires {
                if !bindings.satisfied(required)
                    && !sink(InvocationError::MissingDependency {
                        name: spec.name.clone(),
                        required: required.clone(),
                    })
                {
                    return;
                }
            }
        }

        if let Some(value) = params.get(&spec.name) {
            if let Some(err) = check_value(spec, value) {
                if !sink(err) {
                    return;
                }
            }
        }
    }
}

fn check_value(spec: &ParameterSpec, value: &ParamValue) -> Option<InvocationError> {
    if spec.readonly {
        return Some(InvocationError::invalid(
            &spec.name,
            "parameter is computed and cannot be set",
        ));
    }
    if !value.matches(&spec.semantic_type) {
        return Some(InvocationError::invalid(
            &spec.name,
            format!("expected {}, got '{value}'", spec.semantic_type),
        ));
    }
    if let Some(allowed) = &spec.allowed_values {
        if !allowed.iter().any(|candidate| candidate.same_as(value)) {
            let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            return Some(InvocationError::invalid(
                &spec.name,
                format!("'{value}' is not one of {}", choices.join(", ")),
            ));
        }
    }
    None
}

use std::collections::BTreeMap;

use crate::params::ParameterSet;
use crate::schema::{DerivedKind, TaskSchema};
use crate::template::substitute;

pub const SUBJECTS_DIR_VAR: &str = "SUBJECTS_DIR";

/// Output parameters (templated or explicitly marked) that ended up bound,
/// keyed by parameter name.
pub fn extract_outputs(schema: &TaskSchema, resolved: &ParameterSet) -> BTreeMap<String, String> {
    schema
        .parameters()
        .iter()
        .filter(|spec| spec.is_output())
        .filter_map(|spec| {
            resolved
                .get(&spec.name)
                .map(|value| (spec.name.clone(), value.to_string()))
        })
        .collect()
}

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The current process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Outputs computed after compilation. Outputs whose inputs are unavailable
/// are left out rather than reported as errors.
pub fn derive_outputs(
    schema: &TaskSchema,
    resolved: &ParameterSet,
    env: &dyn EnvSource,
) -> BTreeMap<String, String> {
    let mut derived = BTreeMap::new();
    for output in schema.derived_outputs() {
        let value = match &output.kind {
            DerivedKind::SubjectsDir { parameter } => resolved
                .get(parameter)
                .map(ToString::to_string)
                .or_else(|| env.var(SUBJECTS_DIR_VAR)),
            DerivedKind::Template { template } => {
                substitute(template, |name| resolved.get(name).map(ToString::to_string)).ok()
            }
        };
        match value {
            Some(value) => {
                derived.insert(output.name.clone(), value);
            }
            None => tracing::debug!(
                task = schema.name(),
                output = %output.name,
                "derived output unavailable"
            ),
        }
    }
    derived
}

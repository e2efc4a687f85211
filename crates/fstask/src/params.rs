use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Name to value bindings for one invocation. Absent names are unbound.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlays `other` on top of this set; bindings in `other` win.
    pub fn merge(&mut self, other: ParameterSet) {
        self.values.extend(other.values);
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_incoming_bindings() {
        let mut base = ParameterSet::new()
            .with("subject_id", "bert")
            .with("num_threads", 2);
        base.merge(ParameterSet::new().with("num_threads", 8));
        assert_eq!(base.get("num_threads"), Some(&ParamValue::Int(8)));
        assert_eq!(base.get("subject_id"), Some(&ParamValue::from("bert")));
    }

    #[test]
    fn deserializes_from_a_plain_map() {
        let set: ParameterSet =
            serde_json::from_str(r#"{"input_volume": "orig.nii.gz", "deface": true}"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("deface"), Some(&ParamValue::Bool(true)));
    }
}

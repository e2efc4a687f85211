use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Semantic type accepted by a parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    String,
    Integer,
    Number,
    Boolean,
    Path,
    StringList,
    PathList,
    NumberList,
    /// Fixed-length sequence with one type per slot.
    Tuple(Vec<SemanticType>),
}

impl SemanticType {
    pub fn is_boolean(&self) -> bool {
        matches!(self, SemanticType::Boolean)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            SemanticType::StringList
                | SemanticType::PathList
                | SemanticType::NumberList
                | SemanticType::Tuple(_)
        )
    }

    fn element(&self) -> Option<SemanticType> {
        match self {
            SemanticType::StringList => Some(SemanticType::String),
            SemanticType::PathList => Some(SemanticType::Path),
            SemanticType::NumberList => Some(SemanticType::Number),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::String => f.write_str("string"),
            SemanticType::Integer => f.write_str("integer"),
            SemanticType::Number => f.write_str("number"),
            SemanticType::Boolean => f.write_str("boolean"),
            SemanticType::Path => f.write_str("path"),
            SemanticType::StringList => f.write_str("list<string>"),
            SemanticType::PathList => f.write_str("list<path>"),
            SemanticType::NumberList => f.write_str("list<number>"),
            SemanticType::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "tuple<{}>", inner.join(", "))
            }
        }
    }
}

/// A concrete value bound to a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// `false`, zero, empty text and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::Bool(b) => *b,
            ParamValue::Int(n) => *n != 0,
            ParamValue::Float(n) => *n != 0.0,
            ParamValue::Text(s) => !s.is_empty(),
            ParamValue::List(items) => !items.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(n) => Some(*n as f64),
            ParamValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Command-line tokens for the value: one per element for sequences.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ParamValue::List(items) => items.iter().flat_map(ParamValue::tokens).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Equality that treats `2` and `2.0` as the same value.
    pub fn same_as(&self, other: &ParamValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn matches(&self, ty: &SemanticType) -> bool {
        match (ty, self) {
            (SemanticType::String | SemanticType::Path, ParamValue::Text(_)) => true,
            (SemanticType::Boolean, ParamValue::Bool(_)) => true,
            (SemanticType::Integer, ParamValue::Int(_)) => true,
            (SemanticType::Integer, ParamValue::Float(n)) => n.fract() == 0.0,
            (SemanticType::Number, ParamValue::Int(_) | ParamValue::Float(_)) => true,
            (SemanticType::Tuple(slots), ParamValue::List(items)) => {
                slots.len() == items.len()
                    && slots.iter().zip(items).all(|(slot, item)| item.matches(slot))
            }
            (list_ty, ParamValue::List(items)) => match list_ty.element() {
                Some(element) => items.iter().all(|item| item.matches(&element)),
                None => false,
            },
            _ => false,
        }
    }

    /// Parses a raw `key=value` style input into a value of the given type.
    pub fn parse_as(raw: &str, ty: &SemanticType) -> Result<ParamValue, String> {
        match ty {
            SemanticType::String | SemanticType::Path => Ok(ParamValue::Text(raw.to_string())),
            SemanticType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(ParamValue::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            SemanticType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| format!("'{raw}' is not an integer")),
            SemanticType::Number => parse_number(raw),
            SemanticType::Tuple(slots) => {
                let parts = split_list(raw);
                if parts.len() != slots.len() {
                    return Err(format!(
                        "expected {} comma-separated values, got {}",
                        slots.len(),
                        parts.len()
                    ));
                }
                parts
                    .iter()
                    .zip(slots)
                    .map(|(part, slot)| ParamValue::parse_as(part, slot))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ParamValue::List)
            }
            list_ty => {
                let element = list_ty
                    .element()
                    .ok_or_else(|| format!("cannot parse values of type {list_ty}"))?;
                split_list(raw)
                    .iter()
                    .map(|part| ParamValue::parse_as(part, &element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ParamValue::List)
            }
        }
    }
}

fn parse_number(raw: &str) -> Result<ParamValue, String> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(ParamValue::Int(n));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(ParamValue::Float)
        .ok_or_else(|| format!("'{raw}' is not a number"))
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&rendered.join(" "))
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_render_without_trailing_zero() {
        assert_eq!(ParamValue::Float(5.0).to_string(), "5");
        assert_eq!(ParamValue::Float(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::Int(1000).to_string(), "1000");
    }

    #[test]
    fn sequences_expand_into_one_token_per_element() {
        let value = ParamValue::from(vec![
            ParamValue::from("frac"),
            ParamValue::from(0),
            ParamValue::from(1),
            ParamValue::from(0.1),
        ]);
        assert_eq!(value.tokens(), vec!["frac", "0", "1", "0.1"]);
    }

    #[test]
    fn zero_and_empty_values_are_falsy() {
        assert!(!ParamValue::Bool(false).is_truthy());
        assert!(!ParamValue::Float(0.0).is_truthy());
        assert!(!ParamValue::Text(String::new()).is_truthy());
        assert!(!ParamValue::List(Vec::new()).is_truthy());
        assert!(ParamValue::Float(0.5).is_truthy());
    }

    #[test]
    fn numeric_values_compare_across_representations() {
        assert!(ParamValue::Int(2).same_as(&ParamValue::Float(2.0)));
        assert!(!ParamValue::Int(2).same_as(&ParamValue::Text("2".into())));
    }

    #[test]
    fn tuple_matching_checks_every_slot() {
        let ty = SemanticType::Tuple(vec![
            SemanticType::String,
            SemanticType::Number,
            SemanticType::Number,
            SemanticType::Number,
        ]);
        let ok = ParamValue::parse_as("abs, -3, -2, 0.1", &ty).unwrap();
        assert!(ok.matches(&ty));
        assert_eq!(ok.tokens(), vec!["abs", "-3", "-2", "0.1"]);
        assert!(ParamValue::parse_as("abs,1", &ty).is_err());
        assert!(!ParamValue::from(vec![1, 2, 3]).matches(&ty));
    }

    #[test]
    fn parse_rejects_mistyped_scalars() {
        assert_eq!(
            ParamValue::parse_as("yes", &SemanticType::Boolean),
            Ok(ParamValue::Bool(true))
        );
        assert!(ParamValue::parse_as("maybe", &SemanticType::Boolean).is_err());
        assert!(ParamValue::parse_as("2.5", &SemanticType::Integer).is_err());
        assert_eq!(
            ParamValue::parse_as("2.5", &SemanticType::Number),
            Ok(ParamValue::Float(2.5))
        );
    }

    #[test]
    fn lists_parse_from_comma_separated_input() {
        let value = ParamValue::parse_as("tp1.mgz, tp2.mgz", &SemanticType::PathList).unwrap();
        assert_eq!(value, ParamValue::from(vec!["tp1.mgz", "tp2.mgz"]));
        assert!(value.matches(&SemanticType::PathList));
        assert!(!value.matches(&SemanticType::NumberList));
    }

    #[test]
    fn untyped_yaml_deserializes_into_values() {
        let value: ParamValue = serde_yaml::from_str("[1000, 0.5, lh, true]").unwrap();
        assert_eq!(
            value,
            ParamValue::List(vec![
                ParamValue::Int(1000),
                ParamValue::Float(0.5),
                ParamValue::Text("lh".into()),
                ParamValue::Bool(true),
            ])
        );
    }
}

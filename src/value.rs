//! The language-neutral value model produced by script execution.
//!
//! Every script result is converted into a [`Value`] before it reaches a
//! formatter, so serializers never see interpreter-native types.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A structured value returned by a script.
///
/// `Value` is the canonical output type of script execution, independent of
/// the sandbox's native representation. A converted table is always either a
/// `Sequence` or a `Mapping`, never a mix of both.
///
/// Mapping keys are kept sorted so serialized output is stable across runs
/// and worker counts.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. All script numbers widen to `f64`.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered list of values.
    Sequence(Vec<Value>),
    /// String keys mapped to values; keys are unique, insertion order is
    /// irrelevant.
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Returns true if this value is a `Sequence` or a `Mapping`.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Returns the mapping entries if this value is a `Mapping`.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the sequence elements if this value is a `Sequence`.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            // Integral numbers serialize as integers so `{a = 1}` comes out
            // as `{"a":1}` rather than `{"a":1.0}`.
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(n) {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(seq) => {
                let mut state = serializer.serialize_seq(Some(seq.len()))?;
                for element in seq {
                    state.serialize_element(element)?;
                }
                state.end()
            }
            Self::Mapping(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

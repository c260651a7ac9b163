//! Parameter value and request spec types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator used when a list value is sent over the wire
pub const LIST_SEPARATOR: &str = "|";

/// A single request parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Plain string value
    Scalar(String),
    /// Multi-value parameter, pipe-joined on the wire
    List(Vec<String>),
}

impl ParamValue {
    /// Wire representation of the value
    pub fn to_wire(&self) -> String {
        match self {
            ParamValue::Scalar(s) => s.clone(),
            ParamValue::List(items) => items.join(LIST_SEPARATOR),
        }
    }

    /// True for an empty scalar or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Scalar(s) => s.is_empty(),
            ParamValue::List(items) => items.is_empty(),
        }
    }

    /// Borrow the scalar value, if this is one
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            ParamValue::List(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Scalar(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(String::from).collect())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

/// Ordered parameter set for one logical request
///
/// A fresh copy is made per attempt; the executor never keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestSpec {
    params: BTreeMap<String, ParamValue>,
}

impl RequestSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a spec from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let params = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { params }
    }

    /// Add a parameter (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Get a scalar parameter value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParamValue::as_scalar)
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.params.remove(key)
    }

    /// Check whether a parameter is present
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Merge string pairs into the spec, overwriting existing keys
    pub fn merge<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in pairs {
            self.params
                .insert(key.clone(), ParamValue::Scalar(value.clone()));
        }
    }

    /// Iterate parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.params.iter()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the spec has no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Flatten into wire pairs (lists pipe-joined)
    pub fn to_wire_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_wire()))
            .collect()
    }
}

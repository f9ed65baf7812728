//! Fragments: the raw, named outputs of upstream agents for one request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::assembly::diagnostics::ValueDigest;

/// Loosely-typed agent output at the language boundary.
///
/// `Scalar` holds a JSON number or boolean as-is, so a type mismatch stays
/// visible to validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawValue {
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
    Text(String),
    Scalar(Value),
    Null,
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawValue::Mapping(map),
            Value::Array(items) => RawValue::Sequence(items),
            Value::String(text) => RawValue::Text(text),
            Value::Null => RawValue::Null,
            scalar @ (Value::Bool(_) | Value::Number(_)) => RawValue::Scalar(scalar),
        }
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Mapping(map) => Value::Object(map),
            RawValue::Sequence(items) => Value::Array(items),
            RawValue::Text(text) => Value::String(text),
            RawValue::Scalar(scalar) => scalar,
            RawValue::Null => Value::Null,
        }
    }
}

impl RawValue {
    pub fn digest(&self) -> ValueDigest {
        match self {
            RawValue::Text(text) => ValueDigest::of_text(text),
            RawValue::Mapping(map) => ValueDigest::of_value(&Value::Object(map.clone())),
            RawValue::Sequence(items) => ValueDigest::of_value(&Value::Array(items.clone())),
            RawValue::Scalar(scalar) => ValueDigest::of_value(scalar),
            RawValue::Null => ValueDigest::of_value(&Value::Null),
        }
    }
}

/// One named output of one upstream agent. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub field_name: String,
    pub raw_value: RawValue,
    pub origin: String,
}

impl Fragment {
    pub fn new(
        field_name: impl Into<String>,
        raw_value: impl Into<RawValue>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            raw_value: raw_value.into(),
            origin: origin.into(),
        }
    }
}

/// All fragments produced for one request, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    fragments: BTreeMap<String, Fragment>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a plain JSON mapping, attributing every entry to `origin`.
    pub fn from_values(values: Map<String, Value>, origin: &str) -> Self {
        let mut set = Self::new();
        for (field_name, value) in values {
            set.insert(Fragment::new(field_name, value, origin));
        }
        set
    }

    /// Inserts a fragment; a later fragment for the same field replaces the earlier one.
    pub fn insert(&mut self, fragment: Fragment) -> Option<Fragment> {
        let replaced = self
            .fragments
            .insert(fragment.field_name.clone(), fragment);
        if let Some(previous) = &replaced {
            debug!(
                "Fragment '{}' from '{}' replaced",
                previous.field_name, previous.origin
            );
        }
        replaced
    }

    pub fn remove(&mut self, field_name: &str) -> Option<Fragment> {
        self.fragments.remove(field_name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }
}

impl IntoIterator for FragmentSet {
    type Item = Fragment;
    type IntoIter = std::collections::btree_map::IntoValues<String, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_values()
    }
}

//! Deterministic Coercer: fixed shape/type fixes applied without any model call.
//!
//! Rules, applied at most once per node in a single structural pass:
//! 1. null where a string is expected -> `""`
//! 2. null where a list is expected -> `[]`
//! 3. null where a mapping is expected -> `{}`
//! 4. scalar or object where a list is expected -> single-element list
//! 5. numeric-looking string where a number is expected -> number
//! 6. missing required key in a mapping -> declared default
//!
//! Valid values pass through untouched; nothing here can fail.

use serde_json::{Map, Number, Value};

use crate::assembly::fallback::fallback;
use crate::assembly::schema::{FieldDescriptor, FieldType};
use crate::assembly::validator::ValidationErrors;

/// A coercion rule that fired at a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionRule {
    NullToEmptyString,
    NullToEmptyList,
    NullToEmptyMapping,
    WrapInList,
    ParseNumber,
    InsertDefault,
}

impl CoercionRule {
    fn describe(self) -> &'static str {
        match self {
            CoercionRule::NullToEmptyString => "null -> ''",
            CoercionRule::NullToEmptyList => "null -> []",
            CoercionRule::NullToEmptyMapping => "null -> {}",
            CoercionRule::WrapInList => "single -> list",
            CoercionRule::ParseNumber => "string -> number",
            CoercionRule::InsertDefault => "missing -> default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRule {
    pub path: String,
    pub rule: CoercionRule,
}

impl std::fmt::Display for AppliedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.rule.describe())
    }
}

/// Result of one coercion pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    pub value: Value,
    pub applied: Vec<AppliedRule>,
}

impl Coercion {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Coerces a value that failed validation with `errors`.
/// With no errors the value is returned as-is.
pub fn coerce(value: Value, descriptor: &FieldDescriptor, errors: &ValidationErrors) -> Coercion {
    let mut applied = Vec::new();
    if errors.is_empty() {
        return Coercion { value, applied };
    }
    let value = coerce_node(
        value,
        &descriptor.field_type,
        !descriptor.required,
        &descriptor.name,
        &mut applied,
    );
    Coercion { value, applied }
}

fn coerce_node(
    value: Value,
    field_type: &FieldType,
    nullable: bool,
    path: &str,
    applied: &mut Vec<AppliedRule>,
) -> Value {
    match (value, field_type) {
        (Value::Null, _) if nullable => Value::Null,
        (Value::Null, FieldType::String) => {
            fire(applied, path, CoercionRule::NullToEmptyString);
            Value::String(String::new())
        }
        (Value::Null, FieldType::List(_)) => {
            fire(applied, path, CoercionRule::NullToEmptyList);
            Value::Array(Vec::new())
        }
        (Value::Null, FieldType::Map) => {
            fire(applied, path, CoercionRule::NullToEmptyMapping);
            Value::Object(Map::new())
        }
        (Value::Null, FieldType::Object(_)) => {
            fire(applied, path, CoercionRule::NullToEmptyMapping);
            coerce_node(Value::Object(Map::new()), field_type, false, path, applied)
        }
        (Value::Array(items), FieldType::List(element)) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| coerce_node(item, element, false, &format!("{path}[{i}]"), applied))
                .collect(),
        ),
        (single, FieldType::List(element)) => {
            fire(applied, path, CoercionRule::WrapInList);
            let item = coerce_node(single, element, false, &format!("{path}[0]"), applied);
            Value::Array(vec![item])
        }
        (Value::String(text), FieldType::Number) => match parse_number(&text) {
            Some(number) => {
                fire(applied, path, CoercionRule::ParseNumber);
                Value::Number(number)
            }
            None => Value::String(text),
        },
        (Value::String(text), FieldType::Integer) => match parse_integer(&text) {
            Some(number) => {
                fire(applied, path, CoercionRule::ParseNumber);
                Value::Number(number)
            }
            None => Value::String(text),
        },
        (Value::Object(mut map), FieldType::Object(fields)) => {
            for field in fields {
                let child_path = format!("{path}.{}", field.name);
                match map.remove(&field.name) {
                    Some(child) => {
                        let child = coerce_node(
                            child,
                            &field.field_type,
                            !field.required,
                            &child_path,
                            applied,
                        );
                        map.insert(field.name.clone(), child);
                    }
                    None if field.required => {
                        fire(applied, &child_path, CoercionRule::InsertDefault);
                        map.insert(field.name.clone(), fallback(field));
                    }
                    None => {}
                }
            }
            Value::Object(map)
        }
        (other, _) => other,
    }
}

fn fire(applied: &mut Vec<AppliedRule>, path: &str, rule: CoercionRule) {
    applied.push(AppliedRule {
        path: path.to_string(),
        rule,
    });
}

fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_integer(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    // "3.0" is an integer in disguise; "3.5" is not.
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(Number::from(float as i64))
    } else {
        None
    }
}

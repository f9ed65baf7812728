//! Target Schema: the static, versioned shape every assembled record must have.
//!
//! A schema is an ordered list of field descriptors. Declaration order drives
//! assembly order, validation order and diagnostics order.
//!
//! Every required descriptor must carry a default; `TargetSchema::check` enforces
//! that (and that each default validates) so fallback can never produce an
//! invalid record.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::assembly::error::ConfigurationError;
use crate::assembly::fallback::fallback;
use crate::assembly::validator::validate;

/// Expected type of a field or list element.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    List(Box<FieldType>),
    /// Mapping with declared sub-fields. Undeclared keys are tolerated and kept.
    Object(Vec<FieldDescriptor>),
    /// Free-form mapping.
    Map,
    Any,
}

impl FieldType {
    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn object(fields: Vec<FieldDescriptor>) -> Self {
        FieldType::Object(fields)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::List(_) => "list",
            FieldType::Object(_) => "object",
            FieldType::Map => "object",
            FieldType::Any => "any",
        }
    }

    /// What a null or blank fragment normalizes to.
    pub fn empty_value(&self) -> Value {
        match self {
            FieldType::String => json!(""),
            FieldType::List(_) => json!([]),
            FieldType::Object(_) | FieldType::Map => json!({}),
            FieldType::Number | FieldType::Integer | FieldType::Boolean | FieldType::Any => {
                Value::Null
            }
        }
    }

    /// Conventional default for a type: empty containers, empty string, zero, false.
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::Number | FieldType::Integer => json!(0),
            FieldType::Boolean => json!(false),
            other => other.empty_value(),
        }
    }

    /// Minimal example of the expected shape, used to steer model repair.
    pub fn example(&self) -> Value {
        match self {
            FieldType::String => json!(""),
            FieldType::Number | FieldType::Integer => json!(0),
            FieldType::Boolean => json!(false),
            FieldType::List(element) => Value::Array(vec![element.example()]),
            FieldType::Object(fields) => {
                let mut map = Map::new();
                for field in fields {
                    map.insert(field.name.clone(), field.field_type.example());
                }
                Value::Object(map)
            }
            FieldType::Map => json!({}),
            FieldType::Any => Value::Null,
        }
    }

    /// Sub-field declared on an object type.
    pub fn sub_field(&self, name: &str) -> Option<&FieldDescriptor> {
        match self {
            FieldType::Object(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }
}

/// Declaration of one field: its type, whether it is required and its default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// A required field. Needs a default before the schema passes `check`.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Uses the type's conventional zero value as the default.
    pub fn defaulted(mut self) -> Self {
        self.default = Some(self.field_type.zero_value());
        self
    }
}

/// A named, versioned record shape. Built once at startup, shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSchema {
    name: String,
    version: String,
    fields: Vec<FieldDescriptor>,
}

impl TargetSchema {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Verifies the schema can always be satisfied by fallback:
    /// no duplicate names, every required descriptor (at any depth) has a
    /// default, and every declared default validates.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        check_fields(&self.name, "", &self.fields)
    }
}

fn check_fields(
    schema: &str,
    prefix: &str,
    fields: &[FieldDescriptor],
) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        if !seen.insert(field.name.as_str()) {
            return Err(ConfigurationError::DuplicateField {
                schema: schema.to_string(),
                path,
            });
        }

        if field.required && field.default.is_none() {
            return Err(ConfigurationError::MissingDefault {
                schema: schema.to_string(),
                path,
            });
        }

        check_type(schema, &path, &field.field_type)?;

        if field.default.is_some() {
            if let Err(errors) = validate(&fallback(field), field) {
                return Err(ConfigurationError::InvalidDefault {
                    schema: schema.to_string(),
                    path,
                    issues: errors.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_type(schema: &str, path: &str, field_type: &FieldType) -> Result<(), ConfigurationError> {
    match field_type {
        FieldType::Object(fields) => check_fields(schema, &format!("{path}."), fields),
        FieldType::List(element) => check_type(schema, &format!("{path}[]"), element),
        _ => Ok(()),
    }
}

//! Fallback Policy: the declared safe default for a field. Never fails.

use serde_json::Value;

use crate::assembly::schema::{FieldDescriptor, FieldType};

/// Returns the descriptor's declared default with required object sub-fields
/// filled in recursively from their own defaults.
///
/// A descriptor without a default falls back to its type's empty value;
/// `TargetSchema::check` rejects that case for required fields at startup.
pub fn fallback(descriptor: &FieldDescriptor) -> Value {
    let base = descriptor
        .default
        .clone()
        .unwrap_or_else(|| descriptor.field_type.empty_value());
    complete_required(base, &descriptor.field_type)
}

fn complete_required(value: Value, field_type: &FieldType) -> Value {
    match (value, field_type) {
        (Value::Object(mut map), FieldType::Object(fields)) => {
            for field in fields.iter().filter(|f| f.required) {
                if !map.contains_key(&field.name) {
                    map.insert(field.name.clone(), fallback(field));
                }
            }
            Value::Object(map)
        }
        (other, _) => other,
    }
}

//! Fragment Normalizer: turns a raw agent output into a parsed JSON value.
//!
//! Text goes through an ordered chain: strict parse, parse with code fences
//! stripped, then parse of the first balanced `{...}` / `[...]` substring.
//! The bracket scan understands JSON strings and escapes, so braces inside
//! string values or a second object later in the text never widen the match.

use serde_json::Value;

use crate::assembly::error::NormalizationError;
use crate::assembly::fragment::RawValue;
use crate::assembly::schema::{FieldDescriptor, FieldType};

/// A parsed fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Value,
    /// True when null or blank input was replaced by the field's empty value.
    pub substituted: bool,
}

/// Normalizes one fragment for the given field.
pub fn normalize(
    raw: RawValue,
    descriptor: &FieldDescriptor,
) -> Result<Normalized, NormalizationError> {
    let value = match raw {
        RawValue::Mapping(map) => Value::Object(map),
        RawValue::Sequence(items) => Value::Array(items),
        RawValue::Scalar(scalar) => scalar,
        RawValue::Null => return Ok(empty_for(descriptor, true)),
        RawValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(empty_for(descriptor, false));
            }
            if accepts_plain_text(&descriptor.field_type) && !looks_structured(trimmed) {
                Value::String(trimmed.to_string())
            } else {
                match parse_text(trimmed) {
                    Some(parsed) => parsed,
                    None => return Err(NormalizationError { text }),
                }
            }
        }
    };

    Ok(Normalized {
        value: unwrap_self_keyed(value, descriptor),
        substituted: false,
    })
}

/// Parses free text into JSON, or `None` when no strategy succeeds.
pub(crate) fn parse_text(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let unfenced = strip_code_fences(text);
    if unfenced == text {
        return first_parsable(text);
    }
    serde_json::from_str(unfenced)
        .ok()
        .or_else(|| first_parsable(unfenced))
        // A stray ``` inside a string value is not a fence.
        .or_else(|| first_parsable(text))
}

fn first_parsable(text: &str) -> Option<Value> {
    balanced_candidates(text)
        .into_iter()
        .find_map(|candidate| serde_json::from_str(candidate).ok())
}

fn empty_for(descriptor: &FieldDescriptor, was_null: bool) -> Normalized {
    if was_null && !descriptor.required {
        return Normalized {
            value: Value::Null,
            substituted: false,
        };
    }
    let value = descriptor.field_type.empty_value();
    // Blank text for a text field is already its own empty value.
    let substituted = was_null || !matches!(descriptor.field_type, FieldType::String | FieldType::Any);
    Normalized { value, substituted }
}

fn accepts_plain_text(field_type: &FieldType) -> bool {
    matches!(field_type, FieldType::String | FieldType::Any)
}

fn looks_structured(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[') || text.starts_with('"') || text.starts_with("```")
}

/// `{"experiences": [...]}` for field `experiences` becomes `[...]`, unless the
/// field is an object that itself declares an `experiences` sub-field.
fn unwrap_self_keyed(value: Value, descriptor: &FieldDescriptor) -> Value {
    match value {
        Value::Object(mut map)
            if map.len() == 1
                && map.contains_key(&descriptor.name)
                && descriptor.field_type.sub_field(&descriptor.name).is_none() =>
        {
            map.remove(&descriptor.name).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Returns the body of the first markdown code fence, or the text unchanged.
fn strip_code_fences(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    let tag_len = after
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let body = &after[tag_len..];
    let end = body.find("```").unwrap_or(body.len());
    body[..end].trim()
}

/// Balanced `{...}` / `[...]` groups not nested in another balanced group,
/// left to right. One pass over the bytes.
///
/// Quotes only open strings inside a group; outside, they are prose. A
/// mismatched closer fails every group still open.
fn balanced_candidates(text: &str) -> Vec<&str> {
    let mut open: Vec<(u8, usize)> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (index, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push((b'}', index)),
            b'[' => open.push((b']', index)),
            b'}' | b']' => match open.pop() {
                Some((close, start)) if close == byte => {
                    // groups closed inside this one are superseded by it
                    while spans.last().is_some_and(|&(inner, _)| inner > start) {
                        spans.pop();
                    }
                    spans.push((start, index + 1));
                }
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    spans.into_iter().map(|(start, end)| &text[start..end]).collect()
}

//! Schema Validator: pure structural check of a value against a field descriptor.
//!
//! Issues are collected depth-first in declaration order, so the same input
//! always yields the same issue list. Issues name JSON kinds, never values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assembly::diagnostics::json_kind;
use crate::assembly::schema::{FieldDescriptor, FieldType, TargetSchema};

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// e.g. `experiences[0].company`
    pub path: String,
    pub expected: String,
    /// Runtime kind found, or `missing`.
    pub actual: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Ordered list of violations for one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    #[cfg(test)]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self.to_strings().join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates `value` as the content of `descriptor`.
///
/// An optional descriptor accepts `null`.
pub fn validate(value: &Value, descriptor: &FieldDescriptor) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();
    check_value(
        value,
        &descriptor.field_type,
        !descriptor.required,
        &descriptor.name,
        &mut issues,
    );
    into_result(issues)
}

/// Validates a whole record: every required field present and every present
/// field well-typed.
pub fn validate_record(
    record: &Map<String, Value>,
    schema: &TargetSchema,
) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();
    check_fields(record, schema.fields(), "", &mut issues);
    into_result(issues)
}

fn into_result(issues: Vec<ValidationIssue>) -> Result<(), ValidationErrors> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(issues))
    }
}

fn check_value(
    value: &Value,
    field_type: &FieldType,
    nullable: bool,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if value.is_null() && nullable {
        return;
    }

    let matches = match (field_type, value) {
        (FieldType::Any, _) => true,
        (FieldType::String, Value::String(_)) => true,
        (FieldType::Number, Value::Number(_)) => true,
        (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (FieldType::Boolean, Value::Bool(_)) => true,
        (FieldType::Map, Value::Object(_)) => true,
        (FieldType::List(element), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                check_value(item, element, false, &format!("{path}[{index}]"), issues);
            }
            true
        }
        (FieldType::Object(fields), Value::Object(map)) => {
            check_fields(map, fields, &format!("{path}."), issues);
            true
        }
        _ => false,
    };

    if !matches {
        issues.push(ValidationIssue {
            path: path.to_string(),
            expected: field_type.name().to_string(),
            actual: json_kind(value).to_string(),
        });
    }
}

fn check_fields(
    map: &Map<String, Value>,
    fields: &[FieldDescriptor],
    prefix: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        match map.get(&field.name) {
            Some(value) => check_value(value, &field.field_type, !field.required, &path, issues),
            None if field.required => issues.push(ValidationIssue {
                path,
                expected: field.field_type.name().to_string(),
                actual: "missing".to_string(),
            }),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn experience() -> FieldType {
        FieldType::object(vec![
            FieldDescriptor::required("company", FieldType::String).defaulted(),
            FieldDescriptor::required("responsibilities", FieldType::list(FieldType::String))
                .defaulted(),
            FieldDescriptor::optional("endDate", FieldType::String),
        ])
    }

    fn experiences() -> FieldDescriptor {
        FieldDescriptor::required("experiences", FieldType::list(experience())).defaulted()
    }

    #[test]
    fn test_valid_nested_list_passes() {
        let value = json!([
            {"company": "Acme", "responsibilities": ["Built the billing pipeline"]},
            {"company": "Initech", "responsibilities": [], "endDate": null}
        ]);
        assert!(validate(&value, &experiences()).is_ok());
    }

    #[test]
    fn test_undeclared_keys_are_tolerated() {
        let value = json!([{"company": "Acme", "responsibilities": [], "team": "infra"}]);
        assert!(validate(&value, &experiences()).is_ok());
    }

    #[test]
    fn test_issues_are_depth_first_in_declaration_order() {
        let value = json!([
            {"responsibilities": [1]},
            {"company": 7, "responsibilities": "many"}
        ]);
        let errors = validate(&value, &experiences()).unwrap_err();
        let paths: Vec<_> = errors.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "experiences[0].company",
                "experiences[0].responsibilities[0]",
                "experiences[1].company",
                "experiences[1].responsibilities",
            ]
        );
        assert_eq!(errors.issues()[0].actual, "missing");
        assert_eq!(errors.issues()[1].actual, "number");
        assert_eq!(errors.issues()[3].expected, "list");
    }

    #[test]
    fn test_required_null_is_rejected_optional_null_is_not() {
        let required = FieldDescriptor::required("summary", FieldType::String).defaulted();
        let optional = FieldDescriptor::optional("summary", FieldType::String);
        assert!(validate(&Value::Null, &required).is_err());
        assert!(validate(&Value::Null, &optional).is_ok());
    }

    #[test]
    fn test_integer_rejects_fractional_numbers() {
        let level = FieldDescriptor::required("level", FieldType::Integer).defaulted();
        assert!(validate(&json!(4), &level).is_ok());
        assert!(validate(&json!(4.5), &level).is_err());
    }

    #[test]
    fn test_issue_display_has_no_values() {
        let summary = FieldDescriptor::required("summary", FieldType::String).defaulted();
        let errors = validate(&json!({"text": "secret"}), &summary).unwrap_err();
        let shown = errors.to_string();
        assert_eq!(shown, "summary: expected string, found object");
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn test_validate_record_reports_missing_required() {
        let schema = TargetSchema::new(
            "resume",
            "1",
            vec![
                experiences(),
                FieldDescriptor::optional("headline", FieldType::String),
            ],
        );
        let record = Map::new();
        let errors = validate_record(&record, &schema).unwrap_err();
        assert_eq!(errors.issues().len(), 1);
        assert_eq!(errors.issues()[0].path, "experiences");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z0-9 ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,12}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_validation_is_pure(value in arb_json()) {
            let descriptor = experiences();
            let first = validate(&value, &descriptor);
            let second = validate(&value, &descriptor);
            prop_assert_eq!(first, second);
        }
    }
}

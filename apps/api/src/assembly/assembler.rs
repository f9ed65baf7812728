//! Schema Assembler: drives every named fragment of one request through
//! normalize → validate → coerce → (model repair) → (fallback) and returns a
//! record that always validates against the target schema, plus one
//! diagnostic per field in schema order.
//!
//! Per-field failures never escape. The only error is a `ConfigurationError`,
//! raised before any fragment is touched (or, in theory, if the final record
//! invariant breaks).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::assembly::coercer::coerce;
use crate::assembly::diagnostics::{RepairDiagnostic, RepairStatus, ValueDigest};
use crate::assembly::error::ConfigurationError;
use crate::assembly::fallback::fallback;
use crate::assembly::fragment::{Fragment, FragmentSet, RawValue};
use crate::assembly::normalizer::{normalize, parse_text};
use crate::assembly::repair::ModelRepair;
use crate::assembly::schema::{FieldDescriptor, TargetSchema};
use crate::assembly::validator::{validate, validate_record, ValidationErrors, ValidationIssue};
use crate::llm_client::TextGenerator;

pub const DEFAULT_REPAIR_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_ENVELOPE_KEY: &str = "extracted_resume";

/// Final schema-conformant output of one assembly.
pub type AssembledRecord = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Upper bound on the single model repair call per field.
    pub repair_timeout: Duration,
    /// Wrapper mapping whose entries are lifted to top-level fragments.
    /// `None` disables envelope handling.
    pub envelope_key: Option<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            repair_timeout: DEFAULT_REPAIR_TIMEOUT,
            envelope_key: Some(DEFAULT_ENVELOPE_KEY.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblyOutcome {
    pub schema_name: String,
    pub schema_version: String,
    pub record: AssembledRecord,
    pub diagnostics: Vec<RepairDiagnostic>,
}

impl AssemblyOutcome {
    pub fn fallback_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.status == RepairStatus::Fallback)
            .count()
    }

    /// True when at least one field carries a default instead of agent output.
    pub fn degraded(&self) -> bool {
        self.fallback_count() > 0
    }
}

#[derive(Clone)]
pub struct SchemaAssembler {
    generator: Arc<dyn TextGenerator>,
    options: AssemblerOptions,
}

impl SchemaAssembler {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AssemblerOptions) -> Self {
        Self { generator, options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Assembles one record from a request's fragments.
    pub async fn assemble(
        &self,
        mut fragments: FragmentSet,
        schema: &TargetSchema,
    ) -> Result<AssemblyOutcome, ConfigurationError> {
        schema.check()?;

        info!(
            "Assembling '{}' v{} from {} fragments",
            schema.name(),
            schema.version(),
            fragments.len()
        );

        self.lift_envelope(&mut fragments, schema);

        let repair = ModelRepair::new(self.generator.as_ref(), self.options.repair_timeout);
        let mut record = AssembledRecord::new();
        let mut diagnostics = Vec::with_capacity(schema.fields().len() + fragments.len());

        for descriptor in schema.fields() {
            let fragment = fragments.remove(&descriptor.name);
            let (value, diagnostic) = assemble_field(descriptor, fragment, &repair).await;
            if let Some(value) = value {
                record.insert(descriptor.name.clone(), value);
            }
            log_diagnostic(&diagnostic);
            diagnostics.push(diagnostic);
        }

        // Whatever is left was never declared. Iteration is by field name.
        for leftover in fragments {
            let mut diagnostic =
                RepairDiagnostic::new(&leftover.field_name, RepairStatus::UnexpectedField);
            diagnostic.original_value_digest = Some(leftover.raw_value.digest());
            diagnostic.origin = Some(leftover.origin);
            log_diagnostic(&diagnostic);
            diagnostics.push(diagnostic);
        }

        validate_record(&record, schema).map_err(|errors| ConfigurationError::RecordInvariant {
            schema: schema.name().to_string(),
            issues: errors.to_string(),
        })?;

        let outcome = AssemblyOutcome {
            schema_name: schema.name().to_string(),
            schema_version: schema.version().to_string(),
            record,
            diagnostics,
        };

        if outcome.degraded() {
            warn!(
                "Assembled '{}' with {} fallback field(s)",
                outcome.schema_name,
                outcome.fallback_count()
            );
        }

        Ok(outcome)
    }

    /// Replaces the envelope fragment by its entries; nested entries win over
    /// top-level fragments of the same name. An envelope that is not a mapping
    /// is left in place and ends up reported as unexpected.
    fn lift_envelope(&self, fragments: &mut FragmentSet, schema: &TargetSchema) {
        let Some(key) = self.options.envelope_key.as_deref() else {
            return;
        };
        if schema.field(key).is_some() {
            return;
        }
        let Some(envelope) = fragments.remove(key) else {
            return;
        };

        let entries = match &envelope.raw_value {
            RawValue::Mapping(map) => Some(map.clone()),
            RawValue::Text(text) => match parse_text(text) {
                Some(Value::Object(map)) => Some(map),
                _ => None,
            },
            RawValue::Sequence(_) | RawValue::Scalar(_) | RawValue::Null => None,
        };

        match entries {
            Some(entries) => {
                debug!("Lifting {} entries from envelope '{}'", entries.len(), key);
                for (field_name, value) in entries {
                    fragments.insert(Fragment::new(field_name, value, envelope.origin.clone()));
                }
            }
            None => {
                warn!("Envelope '{}' is not a mapping; leaving it as a fragment", key);
                fragments.insert(envelope);
            }
        }
    }
}

async fn assemble_field(
    descriptor: &FieldDescriptor,
    fragment: Option<Fragment>,
    repair: &ModelRepair<'_>,
) -> (Option<Value>, RepairDiagnostic) {
    let Some(fragment) = fragment else {
        if !descriptor.required && descriptor.default.is_none() {
            return (None, RepairDiagnostic::new(&descriptor.name, RepairStatus::Omitted));
        }
        let value = fallback(descriptor);
        let mut diagnostic = RepairDiagnostic::new(&descriptor.name, RepairStatus::Fallback);
        diagnostic
            .issues
            .push(format!("{}: no fragment produced", descriptor.name));
        diagnostic.final_value_digest = Some(ValueDigest::of_value(&value));
        return (Some(value), diagnostic);
    };

    let mut diagnostic = RepairDiagnostic::new(&descriptor.name, RepairStatus::Ok);
    diagnostic.original_value_digest = Some(fragment.raw_value.digest());
    diagnostic.origin = Some(fragment.origin);

    let value = resolve(descriptor, fragment.raw_value, repair, &mut diagnostic).await;
    diagnostic.final_value_digest = Some(ValueDigest::of_value(&value));
    (Some(value), diagnostic)
}

/// Runs one present fragment through the repair ladder, recording each step
/// on `diagnostic`. Always yields a value that validates against `descriptor`.
async fn resolve(
    descriptor: &FieldDescriptor,
    raw: RawValue,
    repair: &ModelRepair<'_>,
    diagnostic: &mut RepairDiagnostic,
) -> Value {
    // Null or blank output carries nothing a model could repair.
    let repairable = match &raw {
        RawValue::Null => false,
        RawValue::Text(text) => !text.trim().is_empty(),
        RawValue::Mapping(_) | RawValue::Sequence(_) | RawValue::Scalar(_) => true,
    };

    let (candidate, errors, offending) = match normalize(raw, descriptor) {
        Ok(normalized) => match validate(&normalized.value, descriptor) {
            Ok(()) => {
                if normalized.substituted {
                    diagnostic.status = RepairStatus::RepairedCoercion;
                    diagnostic.repairs.push(format!(
                        "{}: empty -> {}",
                        descriptor.name, normalized.value
                    ));
                }
                return normalized.value;
            }
            Err(errors) => {
                let offending = normalized.value.to_string();
                (normalized.value, errors, offending)
            }
        },
        Err(err) => {
            diagnostic.issues.push(err.to_string());
            let errors = ValidationErrors(vec![ValidationIssue {
                path: descriptor.name.clone(),
                expected: descriptor.field_type.name().to_string(),
                actual: "unparseable text".to_string(),
            }]);
            (Value::String(err.text.clone()), errors, err.text)
        }
    };
    diagnostic.issues.extend(errors.to_strings());

    let coerced = coerce(candidate, descriptor, &errors);
    if coerced.changed() && validate(&coerced.value, descriptor).is_ok() {
        diagnostic.status = RepairStatus::RepairedCoercion;
        diagnostic
            .repairs
            .extend(coerced.applied.iter().map(ToString::to_string));
        return coerced.value;
    }

    if repairable {
        diagnostic.attempts = 1;
        match repair.repair(descriptor, &offending).await {
            Ok(value) => {
                diagnostic.status = RepairStatus::RepairedModel;
                return value;
            }
            Err(failure) => diagnostic.issues.push(failure.to_string()),
        }
    }

    diagnostic.status = RepairStatus::Fallback;
    fallback(descriptor)
}

fn log_diagnostic(diagnostic: &RepairDiagnostic) {
    let original = digest_label(diagnostic.original_value_digest.as_ref());
    let final_value = digest_label(diagnostic.final_value_digest.as_ref());
    match diagnostic.status {
        RepairStatus::Ok | RepairStatus::Omitted => debug!(
            "Field '{}': {:?} ({})",
            diagnostic.field_name, diagnostic.status, final_value
        ),
        RepairStatus::RepairedCoercion | RepairStatus::RepairedModel => info!(
            "Field '{}': {:?} after {} repair call(s) ({} -> {})",
            diagnostic.field_name, diagnostic.status, diagnostic.attempts, original, final_value
        ),
        RepairStatus::Fallback => warn!(
            "Field '{}': FALLBACK after {} repair call(s) ({} -> {}); issues: {}",
            diagnostic.field_name,
            diagnostic.attempts,
            original,
            final_value,
            diagnostic.issues.join("; ")
        ),
        RepairStatus::UnexpectedField => warn!(
            "Dropping undeclared field '{}' from '{}' ({})",
            diagnostic.field_name,
            diagnostic.origin.as_deref().unwrap_or("unknown"),
            original
        ),
    }
}

fn digest_label(digest: Option<&ValueDigest>) -> String {
    digest.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::catalog::SchemaRegistry;
    use crate::assembly::schema::FieldType;
    use crate::llm_client::testing::ScriptedGenerator;
    use proptest::prelude::*;
    use serde_json::json;

    fn resume_schema() -> TargetSchema {
        let project = FieldType::object(vec![
            FieldDescriptor::required("id", FieldType::String).defaulted(),
            FieldDescriptor::optional("url", FieldType::String),
        ]);
        TargetSchema::new(
            "resume",
            "1",
            vec![
                FieldDescriptor::required("skills", FieldType::list(FieldType::String))
                    .defaulted(),
                FieldDescriptor::required("projects", FieldType::list(project)).defaulted(),
                FieldDescriptor::required("summary", FieldType::String).defaulted(),
                FieldDescriptor::required("education", FieldType::list(FieldType::Map))
                    .defaulted(),
                FieldDescriptor::optional("headline", FieldType::String),
            ],
        )
    }

    fn assembler(generator: ScriptedGenerator) -> (SchemaAssembler, Arc<ScriptedGenerator>) {
        let generator = Arc::new(generator);
        let assembler = SchemaAssembler::new(generator.clone(), AssemblerOptions::default());
        (assembler, generator)
    }

    fn fragments(values: Value) -> FragmentSet {
        FragmentSet::from_values(values.as_object().cloned().unwrap_or_default(), "test_agent")
    }

    fn status_of(outcome: &AssemblyOutcome, field: &str) -> RepairStatus {
        outcome
            .diagnostics
            .iter()
            .find(|d| d.field_name == field)
            .map(|d| d.status)
            .unwrap()
    }

    fn diagnostic<'a>(outcome: &'a AssemblyOutcome, field: &str) -> &'a RepairDiagnostic {
        outcome
            .diagnostics
            .iter()
            .find(|d| d.field_name == field)
            .unwrap()
    }

    #[tokio::test]
    async fn test_null_list_is_coerced_to_empty() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({"skills": null})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(outcome.record["skills"], json!([]));
        assert_eq!(status_of(&outcome, "skills"), RepairStatus::RepairedCoercion);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_json_string_object_is_parsed_and_wrapped() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({"projects": "{\"id\":\"p1\"}"})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(outcome.record["projects"], json!([{"id": "p1"}]));
        assert_eq!(status_of(&outcome, "projects"), RepairStatus::RepairedCoercion);
        assert!(diagnostic(&outcome, "projects")
            .repairs
            .contains(&"projects: single -> list".to_string()));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_fenced_object_for_string_falls_back_after_one_repair() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(
                fragments(json!({"summary": "```json\n{\"text\":\"ok\"}\n```"})),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!(""));
        let summary = diagnostic(&outcome, "summary");
        assert_eq!(summary.status, RepairStatus::Fallback);
        assert_eq!(summary.attempts, 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_bool_for_string_field_is_a_reported_mismatch() {
        let (assembler, generator) = assembler(ScriptedGenerator::replying(&["\"Backend engineer\""]));

        let outcome = assembler
            .assemble(fragments(json!({"summary": true})), &resume_schema())
            .await
            .unwrap();

        let summary = diagnostic(&outcome, "summary");
        assert_eq!(summary.status, RepairStatus::RepairedModel);
        assert_eq!(summary.attempts, 1);
        assert!(summary
            .issues
            .contains(&"summary: expected string, found boolean".to_string()));
        assert_eq!(outcome.record["summary"], json!("Backend engineer"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_falls_back_without_repair() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(outcome.record["education"], json!([]));
        let education = diagnostic(&outcome, "education");
        assert_eq!(education.status, RepairStatus::Fallback);
        assert_eq!(education.attempts, 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_undeclared_field_is_dropped_and_reported() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(
                fragments(json!({"skills": ["Rust"], "debug_notes": "x"})),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert!(!outcome.record.contains_key("debug_notes"));
        let last = outcome.diagnostics.last().unwrap();
        assert_eq!(last.field_name, "debug_notes");
        assert_eq!(last.status, RepairStatus::UnexpectedField);
        assert_eq!(last.origin.as_deref(), Some("test_agent"));
    }

    #[tokio::test]
    async fn test_missing_default_fails_before_any_fragment() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());
        let broken = TargetSchema::new(
            "resume",
            "1",
            vec![
                FieldDescriptor::required("summary", FieldType::String).defaulted(),
                FieldDescriptor::required("education", FieldType::list(FieldType::Map)),
            ],
        );

        let result = assembler
            .assemble(fragments(json!({"summary": {"broken": true}})), &broken)
            .await;

        assert!(matches!(
            result,
            Err(ConfigurationError::MissingDefault { ref path, .. }) if path == "education"
        ));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_repair_success_is_reported() {
        let (assembler, generator) =
            assembler(ScriptedGenerator::replying(&["A backend engineer."]));

        let outcome = assembler
            .assemble(
                fragments(json!({"summary": {"text": "A backend engineer."}})),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!("A backend engineer."));
        let summary = diagnostic(&outcome, "summary");
        assert_eq!(summary.status, RepairStatus::RepairedModel);
        assert_eq!(summary.attempts, 1);
        assert_eq!(generator.calls(), 1);
        // skills, projects and education were never produced
        assert_eq!(outcome.fallback_count(), 3);
    }

    #[tokio::test]
    async fn test_repair_is_called_at_most_once_per_field() {
        let (assembler, generator) =
            assembler(ScriptedGenerator::replying(&["[42]", "[42]", "[42]"]));

        let outcome = assembler
            .assemble(
                fragments(json!({
                    "skills": [{"a": 1}],
                    "projects": [7],
                    "summary": {"b": 2},
                })),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(generator.calls(), 3);
        for field in ["skills", "projects", "summary"] {
            let d = diagnostic(&outcome, field);
            assert_eq!(d.attempts, 1, "{field}");
            assert_eq!(d.status, RepairStatus::Fallback, "{field}");
        }
        assert_eq!(outcome.fallback_count(), 4);
    }

    #[tokio::test]
    async fn test_unparseable_text_goes_to_repair_then_fallback() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({"projects": "{\"id\": \"p1\""})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(outcome.record["projects"], json!([]));
        let projects = diagnostic(&outcome, "projects");
        assert_eq!(projects.status, RepairStatus::Fallback);
        assert_eq!(projects.attempts, 1);
        assert!(generator.prompts()[0].contains("{\"id\": \"p1\""));
    }

    #[tokio::test]
    async fn test_broken_json_for_string_field_is_not_accepted_verbatim() {
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({"summary": "{\"text\": "})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!(""));
        assert_eq!(status_of(&outcome, "summary"), RepairStatus::Fallback);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repair_timeout_falls_back() {
        let generator = Arc::new(
            ScriptedGenerator::replying(&[r#""late""#]).with_delay(Duration::from_secs(60)),
        );
        let assembler = SchemaAssembler::new(
            generator.clone(),
            AssemblerOptions {
                repair_timeout: Duration::from_secs(5),
                ..AssemblerOptions::default()
            },
        );

        let outcome = assembler
            .assemble(fragments(json!({"summary": {"x": 1}})), &resume_schema())
            .await
            .unwrap();

        let summary = diagnostic(&outcome, "summary");
        assert_eq!(summary.status, RepairStatus::Fallback);
        assert!(summary.issues.iter().any(|i| i.contains("timed out")));
    }

    #[tokio::test]
    async fn test_optional_field_without_fragment_is_omitted() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({})), &resume_schema())
            .await
            .unwrap();

        assert!(!outcome.record.contains_key("headline"));
        assert_eq!(status_of(&outcome, "headline"), RepairStatus::Omitted);
    }

    #[tokio::test]
    async fn test_diagnostics_follow_schema_order_regardless_of_insertion() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());
        let mut forward = FragmentSet::new();
        let mut backward = FragmentSet::new();
        let entries = [
            ("summary", json!("ok")),
            ("zeta", json!(1)),
            ("skills", json!(["Rust"])),
            ("alpha", json!(2)),
        ];
        for (name, value) in entries.iter() {
            forward.insert(Fragment::new(*name, value.clone(), "a"));
        }
        for (name, value) in entries.iter().rev() {
            backward.insert(Fragment::new(*name, value.clone(), "a"));
        }

        let first = assembler.assemble(forward, &resume_schema()).await.unwrap();
        let second = assembler.assemble(backward, &resume_schema()).await.unwrap();

        let names = |o: &AssemblyOutcome| {
            o.diagnostics
                .iter()
                .map(|d| d.field_name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            names(&first),
            vec!["skills", "projects", "summary", "education", "headline", "alpha", "zeta"]
        );
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[tokio::test]
    async fn test_envelope_entries_are_lifted_and_preferred() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(
                fragments(json!({
                    "summary": "top level",
                    "extracted_resume": {"summary": "nested", "skills": ["Rust"]},
                })),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!("nested"));
        assert_eq!(outcome.record["skills"], json!(["Rust"]));
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.field_name != "extracted_resume"));
    }

    #[tokio::test]
    async fn test_envelope_as_json_text_is_lifted() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(
                fragments(json!({"extracted_resume": "```json\n{\"summary\": \"nested\"}\n```"})),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!("nested"));
    }

    #[tokio::test]
    async fn test_unusable_envelope_is_reported_unexpected() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(fragments(json!({"extracted_resume": "not json"})), &resume_schema())
            .await
            .unwrap();

        assert_eq!(
            status_of(&outcome, "extracted_resume"),
            RepairStatus::UnexpectedField
        );
    }

    #[tokio::test]
    async fn test_envelope_handling_can_be_disabled() {
        let generator = Arc::new(ScriptedGenerator::failing());
        let assembler = SchemaAssembler::new(
            generator,
            AssemblerOptions {
                envelope_key: None,
                ..AssemblerOptions::default()
            },
        );

        let outcome = assembler
            .assemble(
                fragments(json!({"extracted_resume": {"summary": "nested"}})),
                &resume_schema(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.record["summary"], json!(""));
        assert_eq!(
            status_of(&outcome, "extracted_resume"),
            RepairStatus::UnexpectedField
        );
    }

    #[tokio::test]
    async fn test_diagnostics_never_contain_fragment_content() {
        let (assembler, _) = assembler(ScriptedGenerator::failing());

        let outcome = assembler
            .assemble(
                fragments(json!({
                    "summary": {"email": "jane.doe@example.com"},
                    "contact": "jane.doe@example.com",
                })),
                &resume_schema(),
            )
            .await
            .unwrap();

        let serialized = serde_json::to_string(&outcome.diagnostics).unwrap();
        assert!(!serialized.contains("jane.doe"));
    }

    #[tokio::test]
    async fn test_builtin_schemas_survive_an_all_null_request() {
        let registry = SchemaRegistry::builtin();
        let (assembler, generator) = assembler(ScriptedGenerator::failing());

        for schema in registry.schemas() {
            let mut set = FragmentSet::new();
            for field in schema.fields() {
                set.insert(Fragment::new(field.name.clone(), Value::Null, "agent"));
            }
            let outcome = assembler.assemble(set, schema).await.unwrap();
            assert!(validate_record(&outcome.record, schema).is_ok(), "{}", schema.name());
        }
        assert_eq!(generator.calls(), 0);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z0-9 {}\\[\\]\"`]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,10}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_fragments() -> impl Strategy<Value = Vec<(String, Value)>> {
        let name = prop_oneof![
            Just("skills".to_string()),
            Just("projects".to_string()),
            Just("summary".to_string()),
            Just("education".to_string()),
            Just("headline".to_string()),
            Just("extracted_resume".to_string()),
            "[a-z]{1,8}",
        ];
        prop::collection::vec((name, arb_json()), 0..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_assembled_record_always_validates(entries in arb_fragments()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let generator = Arc::new(ScriptedGenerator::replying(&["{", "[]", "\"\""]));
            let assembler = SchemaAssembler::new(generator.clone(), AssemblerOptions::default());
            let schema = resume_schema();

            let mut set = FragmentSet::new();
            for (name, value) in entries {
                set.insert(Fragment::new(name, value, "agent"));
            }

            let outcome = runtime.block_on(assembler.assemble(set, &schema)).unwrap();

            prop_assert!(validate_record(&outcome.record, &schema).is_ok());
            prop_assert!(generator.calls() <= schema.fields().len());
            prop_assert!(outcome.diagnostics.iter().all(|d| d.attempts <= 1));
        }
    }
}

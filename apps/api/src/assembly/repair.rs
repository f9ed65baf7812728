//! Model Repair Step: one bounded, deterministic call to the text generator.
//!
//! The reply is treated like any other agent output: normalized, validated,
//! and coerced if nearly right. Anything else is a `RepairFailure`, which the
//! assembler turns into a fallback. Nothing here retries.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::assembly::coercer::coerce;
use crate::assembly::error::{truncate_chars, RepairFailure};
use crate::assembly::fragment::RawValue;
use crate::assembly::normalizer::normalize;
use crate::assembly::prompts::{MAX_FRAGMENT_CHARS, REPAIR_PROMPT_TEMPLATE, REPAIR_SYSTEM};
use crate::assembly::schema::FieldDescriptor;
use crate::assembly::validator::validate;
use crate::llm_client::{GenerateOptions, TextGenerator};

pub struct ModelRepair<'a> {
    generator: &'a dyn TextGenerator,
    timeout: Duration,
}

impl<'a> ModelRepair<'a> {
    pub fn new(generator: &'a dyn TextGenerator, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Asks the model once to rewrite `offending` into the descriptor's shape.
    pub async fn repair(
        &self,
        descriptor: &FieldDescriptor,
        offending: &str,
    ) -> Result<Value, RepairFailure> {
        let prompt = build_prompt(descriptor, offending);

        let reply = tokio::time::timeout(
            self.timeout,
            self.generator.generate(
                REPAIR_SYSTEM,
                &prompt,
                GenerateOptions::deterministic_json(),
            ),
        )
        .await
        .map_err(|_| RepairFailure::Timeout(self.timeout))??;

        debug!(
            "Repair reply for '{}': {} bytes",
            descriptor.name,
            reply.len()
        );

        let value = normalize(RawValue::Text(reply), descriptor)?.value;
        match validate(&value, descriptor) {
            Ok(()) => Ok(value),
            Err(errors) => {
                let coerced = coerce(value, descriptor, &errors);
                validate(&coerced.value, descriptor).map_err(RepairFailure::StillInvalid)?;
                Ok(coerced.value)
            }
        }
    }
}

fn build_prompt(descriptor: &FieldDescriptor, offending: &str) -> String {
    REPAIR_PROMPT_TEMPLATE
        .replace("{field_name}", &descriptor.name)
        .replace("{example}", &descriptor.field_type.example().to_string())
        .replace("{fragment}", &truncate_chars(offending, MAX_FRAGMENT_CHARS))
}

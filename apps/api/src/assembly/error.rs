use std::time::Duration;

use thiserror::Error;

use crate::assembly::validator::ValidationErrors;
use crate::llm_client::LlmError;

/// The only fatal assembly condition: a Target Schema that cannot guarantee a
/// valid record. Raised at startup and before any fragment is processed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("schema '{schema}': required field '{path}' has no default")]
    MissingDefault { schema: String, path: String },

    #[error("schema '{schema}': default for '{path}' does not validate: {issues}")]
    InvalidDefault {
        schema: String,
        path: String,
        issues: String,
    },

    #[error("schema '{schema}': field '{path}' is declared more than once")]
    DuplicateField { schema: String, path: String },

    #[error("schema '{0}' is not registered")]
    UnknownSchema(String),

    #[error("schema '{schema}': assembled record failed final validation: {issues}")]
    RecordInvariant { schema: String, issues: String },
}

/// A fragment whose text could not be parsed into any JSON structure.
///
/// Carries the original text so the assembler can keep going with it as a
/// placeholder; `Display` never includes the text itself.
#[derive(Debug, Clone, Error)]
#[error("fragment text ({} bytes) is not parseable as JSON", .text.len())]
pub struct NormalizationError {
    pub text: String,
}

/// Why a single model repair attempt did not produce a valid value.
#[derive(Debug, Error)]
pub enum RepairFailure {
    #[error("repair call timed out after {0:?}")]
    Timeout(Duration),

    #[error("repair call failed: {0}")]
    Capability(#[from] LlmError),

    #[error("repair reply was not parseable: {0}")]
    Unparseable(#[from] NormalizationError),

    #[error("repair reply still invalid: {0}")]
    StillInvalid(ValidationErrors),
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

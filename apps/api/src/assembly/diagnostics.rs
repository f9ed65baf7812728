//! Per-field repair diagnostics. Digests only; fragment content never leaves here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex characters of SHA-256 kept in a digest.
const DIGEST_HEX_LEN: usize = 16;

/// A content-free fingerprint of a value: JSON kind, serialized size and a
/// truncated SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDigest {
    pub kind: String,
    pub bytes: usize,
    pub sha256: String,
}

impl ValueDigest {
    pub fn of_value(value: &Value) -> Self {
        let serialized = value.to_string();
        Self {
            kind: json_kind(value).to_string(),
            bytes: serialized.len(),
            sha256: short_sha256(serialized.as_bytes()),
        }
    }

    /// Digest of free text that has not been parsed yet.
    pub fn of_text(text: &str) -> Self {
        Self {
            kind: "text".to_string(),
            bytes: text.len(),
            sha256: short_sha256(text.as_bytes()),
        }
    }
}

impl std::fmt::Display for ValueDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}b:{}", self.kind, self.bytes, self.sha256)
    }
}

fn short_sha256(bytes: &[u8]) -> String {
    let mut encoded = hex::encode(Sha256::digest(bytes));
    encoded.truncate(DIGEST_HEX_LEN);
    encoded
}

/// Name of a JSON value's runtime kind, as used in diagnostics and validation issues.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Outcome of assembling one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    /// Valid as produced.
    Ok,
    /// Made valid by deterministic coercion.
    RepairedCoercion,
    /// Made valid by the single model repair call.
    RepairedModel,
    /// Replaced by the declared default.
    Fallback,
    /// Not declared by the schema; dropped.
    UnexpectedField,
    /// Optional, absent and without a default; left out of the record.
    Omitted,
}

/// One entry per processed fragment (or declared field), in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairDiagnostic {
    pub field_name: String,
    pub origin: Option<String>,
    pub original_value_digest: Option<ValueDigest>,
    pub status: RepairStatus,
    /// Model repair calls made for this field: 0 or 1.
    pub attempts: u8,
    pub final_value_digest: Option<ValueDigest>,
    /// Coercion rules and other repairs applied, e.g. `skills: null -> []`.
    #[serde(default)]
    pub repairs: Vec<String>,
    /// Validation issues and failure reasons behind a non-OK status.
    #[serde(default)]
    pub issues: Vec<String>,
}

impl RepairDiagnostic {
    pub(crate) fn new(field_name: &str, status: RepairStatus) -> Self {
        Self {
            field_name: field_name.to_string(),
            origin: None,
            original_value_digest: None,
            status,
            attempts: 0,
            final_value_digest: None,
            repairs: Vec::new(),
            issues: Vec::new(),
        }
    }
}

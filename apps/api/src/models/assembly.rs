use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted assembly outcome. `record` and `diagnostics` are stored as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssembledRecordRow {
    pub id: Uuid,
    pub pipeline: String,
    pub schema_name: String,
    pub schema_version: String,
    pub record: Value,
    pub diagnostics: Value,
    pub fallback_count: i32,
    pub final_content: Option<String>,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}

//! Persistence of assembly outcomes: one row in `assembled_records` plus a
//! JSON snapshot in object storage.

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::assembly::AssemblyOutcome;
use crate::models::assembly::AssembledRecordRow;

pub struct StoredAssembly {
    pub id: Uuid,
    pub s3_key: String,
}

pub fn snapshot_key(id: Uuid) -> String {
    format!("assemblies/{id}.json")
}

/// Object-storage body: the outcome plus any composed text.
#[derive(Serialize)]
struct Snapshot<'a> {
    #[serde(flatten)]
    outcome: &'a AssemblyOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_content: Option<&'a str>,
}

/// Inserts the outcome, then uploads its snapshot.
pub async fn save_outcome(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    pipeline: &str,
    outcome: &AssemblyOutcome,
    final_content: Option<&str>,
) -> Result<StoredAssembly> {
    let id = Uuid::new_v4();
    let s3_key = snapshot_key(id);
    let record = Value::Object(outcome.record.clone());
    let diagnostics =
        serde_json::to_value(&outcome.diagnostics).context("Failed to serialize diagnostics")?;

    sqlx::query(
        r#"
        INSERT INTO assembled_records
            (id, pipeline, schema_name, schema_version, record, diagnostics, fallback_count,
             final_content, s3_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(pipeline)
    .bind(&outcome.schema_name)
    .bind(&outcome.schema_version)
    .bind(&record)
    .bind(&diagnostics)
    .bind(outcome.fallback_count() as i32)
    .bind(final_content)
    .bind(&s3_key)
    .execute(pool)
    .await?;

    info!("Inserted assembled record {id} ({pipeline})");

    let snapshot = serde_json::to_vec_pretty(&Snapshot {
        outcome,
        final_content,
    })
    .context("Failed to serialize snapshot")?;
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(snapshot))
        .content_type("application/json")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded assembly snapshot to s3://{}/{}", s3_bucket, s3_key);

    Ok(StoredAssembly { id, s3_key })
}

pub async fn get_outcome(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AssembledRecordRow>, sqlx::Error> {
    sqlx::query_as::<_, AssembledRecordRow>("SELECT * FROM assembled_records WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `assembled_records` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assembled_records (
            id              UUID PRIMARY KEY,
            pipeline        TEXT NOT NULL,
            schema_name     TEXT NOT NULL,
            schema_version  TEXT NOT NULL,
            record          JSONB NOT NULL,
            diagnostics     JSONB NOT NULL,
            fallback_count  INTEGER NOT NULL DEFAULT 0,
            final_content   TEXT,
            s3_key          TEXT NOT NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::pipeline::{PipelineCatalog, PipelineRunner};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Runs agent stages and assembles their output. Holds the schema registry.
    pub runner: PipelineRunner,
    pub pipelines: Arc<PipelineCatalog>,
}

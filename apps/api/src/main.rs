mod assembly;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assembly::assembler::DEFAULT_ENVELOPE_KEY;
use crate::assembly::{AssemblerOptions, SchemaAssembler, SchemaRegistry};
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{LlmClient, TextGenerator};
use crate::pipeline::{PipelineCatalog, PipelineRunner};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Target schemas are checked before anything else touches them
    let schemas = SchemaRegistry::builtin();
    schemas
        .check_all()
        .context("Built-in target schemas are misconfigured")?;
    info!("{} target schemas registered", schemas.schemas().count());

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm: Arc<dyn TextGenerator> = Arc::new(
        LlmClient::new(config.anthropic_api_key.clone())
            .context("Failed to build LLM HTTP client")?,
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let assembler = SchemaAssembler::new(
        llm.clone(),
        AssemblerOptions {
            repair_timeout: config.repair_timeout,
            envelope_key: config
                .accept_resume_envelope
                .then(|| DEFAULT_ENVELOPE_KEY.to_string()),
        },
    );
    info!(
        "Assembler ready (repair timeout {:?}, envelope {:?})",
        assembler.options().repair_timeout,
        assembler.options().envelope_key
    );

    let runner = PipelineRunner::new(llm, assembler, Arc::new(schemas));

    let pipelines = PipelineCatalog::builtin();
    info!("{} pipelines registered", pipelines.pipelines().count());

    // Build app state
    let state = AppState {
        db,
        s3,
        config: config.clone(),
        runner,
        pipelines: Arc::new(pipelines),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "tailor-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

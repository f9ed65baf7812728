//! Axum route handlers for the Assembly and Pipeline APIs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::assembly::assembler::AssembledRecord;
use crate::assembly::catalog::{COVER_LETTER, STRATEGIC_RESUME, THEME_PACKAGE};
use crate::assembly::{AssemblyOutcome, FragmentSet, RepairDiagnostic};
use crate::errors::AppError;
use crate::models::assembly::AssembledRecordRow;
use crate::pipeline::cover_letter::compose_final_content;
use crate::pipeline::stage::PipelineInput;
use crate::pipeline::store::{get_outcome, save_outcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    #[serde(default)]
    pub fragments: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct StrategicAnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_text: String,
    pub job_description: String,
    pub optional_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub design_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    /// Absent when the outcome could not be persisted.
    pub id: Option<Uuid>,
    pub pipeline: String,
    pub schema_name: String,
    pub schema_version: String,
    pub record: AssembledRecord,
    pub diagnostics: Vec<RepairDiagnostic>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assemble/:schema
///
/// Assembles caller-supplied fragments directly, with no upstream agents.
/// Nothing is persisted.
pub async fn handle_assemble(
    State(state): State<AppState>,
    Path(schema): Path<String>,
    Json(request): Json<AssembleRequest>,
) -> Result<Json<AssemblyOutcome>, AppError> {
    let fragments = FragmentSet::from_values(request.fragments, "request");
    let outcome = state.runner.assemble(&schema, fragments).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/resumes/strategic-analysis
pub async fn handle_strategic_analysis(
    State(state): State<AppState>,
    Json(request): Json<StrategicAnalysisRequest>,
) -> Result<Json<PipelineResponse>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_description", &request.job_description)?;

    let input = PipelineInput {
        resume_text: request.resume_text,
        job_description: request.job_description,
        user_prompt: None,
    };
    Ok(Json(run_and_store(&state, STRATEGIC_RESUME, &input, None).await?))
}

/// POST /api/v1/cover-letters/strategic
///
/// analyst → writer → editor, then joins the paragraphs into `final_content`.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<PipelineResponse>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_description", &request.job_description)?;

    let input = PipelineInput {
        resume_text: request.resume_text,
        job_description: request.job_description,
        user_prompt: request.optional_prompt,
    };
    let response = run_and_store(&state, COVER_LETTER, &input, Some(compose_final_content)).await?;
    Ok(Json(response))
}

/// POST /api/v1/themes
pub async fn handle_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<PipelineResponse>, AppError> {
    require_text("design_prompt", &request.design_prompt)?;

    let input = PipelineInput {
        user_prompt: Some(request.design_prompt),
        ..PipelineInput::default()
    };
    Ok(Json(run_and_store(&state, THEME_PACKAGE, &input, None).await?))
}

/// GET /api/v1/assemblies/:id
pub async fn handle_get_assembly(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssembledRecordRow>, AppError> {
    let row = get_outcome(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assembly {id} not found")))?;
    Ok(Json(row))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Runs a built-in pipeline and persists the outcome, together with the
/// composed final text when `compose` is given. A storage failure is
/// reported in the response instead of failing the request.
async fn run_and_store(
    state: &AppState,
    pipeline_name: &str,
    input: &PipelineInput,
    compose: Option<fn(&AssembledRecord) -> String>,
) -> Result<PipelineResponse, AppError> {
    let pipeline = state.pipelines.get(pipeline_name).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Pipeline '{pipeline_name}' is not registered"))
    })?;

    let outcome = state.runner.run(pipeline, input).await?;
    let final_content = compose.map(|compose| compose(&outcome.record));

    let (id, persistence_error) = match save_outcome(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        pipeline_name,
        &outcome,
        final_content.as_deref(),
    )
    .await
    {
        Ok(stored) => {
            info!("Stored '{pipeline_name}' outcome {} at {}", stored.id, stored.s3_key);
            (Some(stored.id), None)
        }
        Err(e) => {
            error!("Failed to persist '{pipeline_name}' outcome: {e:#}");
            (None, Some(format!("{e:#}")))
        }
    };

    Ok(PipelineResponse {
        id,
        pipeline: pipeline_name.to_string(),
        degraded: outcome.degraded(),
        schema_name: outcome.schema_name,
        schema_version: outcome.schema_version,
        record: outcome.record,
        diagnostics: outcome.diagnostics,
        final_content,
        persistence_error,
    })
}

//! Pipeline Runner: runs agent stages in order, turns their replies into
//! fragments, and hands the fragment set to the assembler once.
//!
//! A failing stage never fails the request: it is logged and contributes no
//! fragment, and the assembler's fallback covers the gap.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::assembly::normalizer::parse_text;
use crate::assembly::{
    AssemblyOutcome, ConfigurationError, Fragment, FragmentSet, RawValue, SchemaAssembler,
    SchemaRegistry,
};
use crate::llm_client::{GenerateOptions, TextGenerator};
use crate::pipeline::stage::{Pipeline, PipelineInput, StageOutput};

#[derive(Clone)]
pub struct PipelineRunner {
    generator: Arc<dyn TextGenerator>,
    assembler: SchemaAssembler,
    schemas: Arc<SchemaRegistry>,
}

impl PipelineRunner {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        assembler: SchemaAssembler,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            generator,
            assembler,
            schemas,
        }
    }

    /// Runs every stage of `pipeline`, then assembles the result.
    ///
    /// The target schema is checked before the first agent call.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        input: &PipelineInput,
    ) -> Result<AssemblyOutcome, ConfigurationError> {
        let schema = self.schemas.get(&pipeline.schema_name)?;
        schema.check()?;

        info!(
            "Running pipeline '{}' ({} stages)",
            pipeline.name,
            pipeline.stages.len()
        );
        let fragments = self.collect_fragments(pipeline, input).await;
        if fragments.is_empty() {
            warn!("Pipeline '{}' produced no fragments", pipeline.name);
        } else {
            info!(
                "Pipeline '{}' produced fragments for {:?}",
                pipeline.name,
                fragments.field_names().collect::<Vec<_>>()
            );
        }
        self.assembler.assemble(fragments, schema).await
    }

    /// Assembles caller-supplied fragments against a registered schema.
    pub async fn assemble(
        &self,
        schema_name: &str,
        fragments: FragmentSet,
    ) -> Result<AssemblyOutcome, ConfigurationError> {
        let schema = self.schemas.get(schema_name)?;
        self.assembler.assemble(fragments, schema).await
    }

    async fn collect_fragments(&self, pipeline: &Pipeline, input: &PipelineInput) -> FragmentSet {
        let mut fragments = FragmentSet::new();
        let mut prior_outputs = Map::new();

        for stage in &pipeline.stages {
            let prompt = stage.render_prompt(input, &prior_outputs);
            let reply = match self
                .generator
                .generate(
                    &stage.system,
                    &prompt,
                    GenerateOptions::agent(stage.temperature),
                )
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(
                        "Stage '{}' of pipeline '{}' failed, continuing without it: {e}",
                        stage.name, pipeline.name
                    );
                    continue;
                }
            };

            info!("Stage '{}' replied with {} bytes", stage.name, reply.len());

            match &stage.output {
                StageOutput::Field(field_name) => {
                    let visible = parse_text(&reply).unwrap_or_else(|| Value::String(reply.clone()));
                    prior_outputs.insert(field_name.clone(), visible);
                    fragments.insert(Fragment::new(
                        field_name.clone(),
                        RawValue::Text(reply),
                        stage.name.clone(),
                    ));
                }
                StageOutput::Spread => match parse_text(&reply) {
                    Some(Value::Object(entries)) => {
                        for (field_name, value) in entries {
                            prior_outputs.insert(field_name.clone(), value.clone());
                            fragments.insert(Fragment::new(field_name, value, stage.name.clone()));
                        }
                    }
                    _ => warn!(
                        "Stage '{}' reply is not a JSON object; no fragments taken",
                        stage.name
                    ),
                },
            }
        }

        fragments
    }
}

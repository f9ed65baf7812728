//! Built-in pipelines. Each feeds the target schema of the same name.

use std::collections::BTreeMap;

use crate::assembly::catalog::{COVER_LETTER, STRATEGIC_RESUME, THEME_PACKAGE};
use crate::pipeline::prompts::*;
use crate::pipeline::stage::{AgentStage, Pipeline, StageOutput};

/// Extraction stages run cold; writing stages get a little room.
const EXTRACTION_TEMPERATURE: f32 = 0.1;
const WRITING_TEMPERATURE: f32 = 0.4;
const EDITING_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Default)]
pub struct PipelineCatalog {
    pipelines: BTreeMap<String, Pipeline>,
}

impl PipelineCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for pipeline in [strategic_resume(), cover_letter(), theme_package()] {
            catalog.pipelines.insert(pipeline.name.clone(), pipeline);
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.pipelines.values()
    }
}

fn field(name: &str) -> StageOutput {
    StageOutput::Field(name.to_string())
}

pub fn strategic_resume() -> Pipeline {
    Pipeline {
        name: STRATEGIC_RESUME.to_string(),
        schema_name: STRATEGIC_RESUME.to_string(),
        stages: vec![
            AgentStage::new(
                "experience_agent",
                RESUME_STRATEGIST_SYSTEM,
                EXPERIENCE_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("experiences"),
            ),
            AgentStage::new(
                "skills_agent",
                RESUME_STRATEGIST_SYSTEM,
                SKILLS_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("skills"),
            ),
            AgentStage::new(
                "projects_agent",
                RESUME_STRATEGIST_SYSTEM,
                PROJECTS_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("projects"),
            ),
            AgentStage::new(
                "education_agent",
                RESUME_STRATEGIST_SYSTEM,
                EDUCATION_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("education"),
            ),
            AgentStage::new(
                "contact_agent",
                RESUME_STRATEGIST_SYSTEM,
                CONTACT_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                StageOutput::Spread,
            ),
            AgentStage::new(
                "summary_agent",
                RESUME_STRATEGIST_SYSTEM,
                SUMMARY_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("summary"),
            ),
        ],
    }
}

/// analyst → writer → editor. The editor's fields replace the writer's draft.
pub fn cover_letter() -> Pipeline {
    Pipeline {
        name: COVER_LETTER.to_string(),
        schema_name: COVER_LETTER.to_string(),
        stages: vec![
            AgentStage::new(
                "cover_letter_analyst",
                COVER_LETTER_ANALYST_SYSTEM,
                COVER_LETTER_ANALYST_PROMPT_TEMPLATE,
                EXTRACTION_TEMPERATURE,
                field("analysis"),
            ),
            AgentStage::new(
                "cover_letter_writer",
                COVER_LETTER_WRITER_SYSTEM,
                COVER_LETTER_WRITER_PROMPT_TEMPLATE,
                WRITING_TEMPERATURE,
                StageOutput::Spread,
            ),
            AgentStage::new(
                "cover_letter_editor",
                COVER_LETTER_EDITOR_SYSTEM,
                COVER_LETTER_EDITOR_PROMPT_TEMPLATE,
                EDITING_TEMPERATURE,
                StageOutput::Spread,
            ),
        ],
    }
}

pub fn theme_package() -> Pipeline {
    Pipeline {
        name: THEME_PACKAGE.to_string(),
        schema_name: THEME_PACKAGE.to_string(),
        stages: vec![
            AgentStage::new(
                "theme_analyst",
                THEME_ANALYST_SYSTEM,
                THEME_ANALYST_PROMPT_TEMPLATE,
                WRITING_TEMPERATURE,
                field("theme_brief"),
            ),
            AgentStage::new(
                "resume_theme_developer",
                THEME_DEVELOPER_SYSTEM,
                RESUME_THEME_PROMPT_TEMPLATE,
                EDITING_TEMPERATURE,
                field("resume_theme"),
            ),
            AgentStage::new(
                "cover_letter_theme_developer",
                THEME_DEVELOPER_SYSTEM,
                COVER_LETTER_THEME_PROMPT_TEMPLATE,
                EDITING_TEMPERATURE,
                field("cover_letter_theme"),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::catalog::SchemaRegistry;
    use crate::pipeline::stage::PipelineInput;

    #[test]
    fn test_every_pipeline_targets_a_registered_schema() {
        let schemas = SchemaRegistry::builtin();
        for pipeline in PipelineCatalog::builtin().pipelines() {
            assert!(schemas.get(&pipeline.schema_name).is_ok(), "{}", pipeline.name);
        }
    }

    #[test]
    fn test_field_stages_name_declared_fields() {
        let schemas = SchemaRegistry::builtin();
        for pipeline in PipelineCatalog::builtin().pipelines() {
            let schema = schemas.get(&pipeline.schema_name).unwrap();
            for stage in &pipeline.stages {
                if let StageOutput::Field(name) = &stage.output {
                    assert!(schema.field(name).is_some(), "{}: {name}", pipeline.name);
                }
            }
        }
    }

    #[test]
    fn test_theme_brief_prompt_keeps_palette_example() {
        let stage = &theme_package().stages[0];
        let input = PipelineInput {
            user_prompt: Some("Dark, minimal, for a data engineer".to_string()),
            ..PipelineInput::default()
        };
        let prompt = stage.render_prompt(&input, &serde_json::Map::new());

        assert!(prompt.contains("Dark, minimal, for a data engineer"));
        assert!(prompt.contains(r##""hex_code": "#1A1A2E""##));
        assert!(prompt.ends_with(r#""cover_letter_direction": "2-8 sentences"}"#));
    }

    #[test]
    fn test_cover_letter_stage_order() {
        let names: Vec<_> = cover_letter().stages.into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["cover_letter_analyst", "cover_letter_writer", "cover_letter_editor"]
        );
    }
}

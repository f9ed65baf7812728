use serde::Deserialize;
use serde_json::{Map, Value};

/// Where a stage's reply goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    /// The raw reply becomes one fragment under this field name.
    Field(String),
    /// Each top-level key of a mapping reply becomes its own fragment.
    /// A reply that is not a mapping produces no fragments.
    Spread,
}

/// One upstream agent call.
#[derive(Debug, Clone)]
pub struct AgentStage {
    pub name: String,
    pub system: String,
    /// Placeholders: {resume_text}, {job_description}, {user_prompt}, {prior_outputs}
    pub prompt_template: String,
    pub temperature: f32,
    pub output: StageOutput,
}

impl AgentStage {
    pub fn new(
        name: &str,
        system: &str,
        prompt_template: &str,
        temperature: f32,
        output: StageOutput,
    ) -> Self {
        Self {
            name: name.to_string(),
            system: system.to_string(),
            prompt_template: prompt_template.to_string(),
            temperature,
            output,
        }
    }

    pub fn render_prompt(&self, input: &PipelineInput, prior_outputs: &Map<String, Value>) -> String {
        let prior = if prior_outputs.is_empty() {
            "(none yet)".to_string()
        } else {
            serde_json::to_string_pretty(prior_outputs).unwrap_or_default()
        };
        let user_prompt = input
            .user_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("(none provided)");

        self.prompt_template
            .replace("{prior_outputs}", &prior)
            .replace("{user_prompt}", user_prompt)
            .replace("{job_description}", &input.job_description)
            .replace("{resume_text}", &input.resume_text)
    }
}

/// A named, ordered list of stages feeding one target schema.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    pub schema_name: String,
    pub stages: Vec<AgentStage>,
}

/// Request-level inputs shared by every stage of a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineInput {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

// Agent pipelines: run upstream LLM stages, then assemble their output
// against a target schema. All LLM calls go through llm_client.

pub mod catalog;
pub mod cover_letter;
pub mod handlers;
pub mod prompts;
pub mod runner;
pub mod stage;
pub mod store;

pub use catalog::PipelineCatalog;
pub use runner::PipelineRunner;

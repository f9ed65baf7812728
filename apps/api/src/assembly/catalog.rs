//! Built-in target schemas, registered once at startup.

use std::collections::BTreeMap;

use serde_json::json;

use crate::assembly::error::ConfigurationError;
use crate::assembly::schema::{FieldDescriptor, FieldType, TargetSchema};

pub const STRATEGIC_RESUME: &str = "strategic_resume";
pub const COVER_LETTER: &str = "cover_letter";
pub const THEME_PACKAGE: &str = "theme_package";

/// Read-only set of target schemas keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, TargetSchema>,
}

impl SchemaRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(strategic_resume());
        registry.register(cover_letter());
        registry.register(theme_package());
        registry
    }

    pub fn register(&mut self, schema: TargetSchema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Result<&TargetSchema, ConfigurationError> {
        self.schemas
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownSchema(name.to_string()))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &TargetSchema> {
        self.schemas.values()
    }

    /// Runs `TargetSchema::check` on every registered schema.
    pub fn check_all(&self) -> Result<(), ConfigurationError> {
        self.schemas.values().try_for_each(TargetSchema::check)
    }
}

fn text(name: &str) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::String).defaulted()
}

fn optional_text(name: &str) -> FieldDescriptor {
    FieldDescriptor::optional(name, FieldType::String)
}

fn text_list(name: &str) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::list(FieldType::String)).defaulted()
}

fn object_list(name: &str, fields: Vec<FieldDescriptor>) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::list(FieldType::object(fields))).defaulted()
}

// ────────────────────────────────────────────────────────────────────────────
// strategic_resume
// ────────────────────────────────────────────────────────────────────────────

pub fn strategic_resume() -> TargetSchema {
    let experience = vec![
        text("id"),
        text("company"),
        text("position"),
        text("startDate"),
        text("endDate"),
        text_list("responsibilities"),
    ];

    let skill = vec![
        text("id"),
        text("name"),
        // 1-5 proficiency
        FieldDescriptor::required("level", FieldType::Integer).defaulted(),
    ];

    let skills = FieldDescriptor::required(
        "skills",
        FieldType::object(vec![object_list("skills", skill), text_list("additional_skills")]),
    )
    .defaulted();

    let project = vec![text("id"), text("name"), text("description"), text("url")];

    let education = vec![
        text("id"),
        text("institution"),
        optional_text("degree"),
        text("startDate"),
        text("endDate"),
    ];

    let contact = vec![
        optional_text("email"),
        optional_text("phone"),
        optional_text("linkedin"),
        optional_text("github"),
        optional_text("website"),
        optional_text("location"),
    ];

    TargetSchema::new(
        STRATEGIC_RESUME,
        "1",
        vec![
            object_list("experiences", experience),
            skills,
            object_list("projects", project),
            object_list("education", education),
            object_list("contact_info", contact),
            text("summary"),
            optional_text("name"),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// cover_letter
// ────────────────────────────────────────────────────────────────────────────

pub fn cover_letter() -> TargetSchema {
    TargetSchema::new(
        COVER_LETTER,
        "1",
        vec![
            FieldDescriptor::optional("analysis", FieldType::Map).with_default(json!({})),
            text("opening_paragraph"),
            text_list("body_paragraphs"),
            optional_text("company_connection"),
            text("closing_paragraph"),
            FieldDescriptor::required("tone", FieldType::String)
                .with_default(json!("professional")),
            FieldDescriptor::required("word_count", FieldType::Integer).defaulted(),
            FieldDescriptor::required("ats_score", FieldType::Integer).defaulted(),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// theme_package
// ────────────────────────────────────────────────────────────────────────────

pub fn theme_package() -> TargetSchema {
    let color = vec![text("role"), text("hex_code")];

    let brief = FieldType::object(vec![
        text("name"),
        text("description"),
        object_list("color_palette", color),
        text_list("google_fonts"),
        optional_text("resume_direction"),
        optional_text("cover_letter_direction"),
    ]);

    let document = || FieldType::object(vec![text("template"), text("styles")]);

    TargetSchema::new(
        THEME_PACKAGE,
        "1",
        vec![
            FieldDescriptor::required("theme_brief", brief).defaulted(),
            FieldDescriptor::required("resume_theme", document()).defaulted(),
            FieldDescriptor::required("cover_letter_theme", document()).defaulted(),
        ],
    )
}

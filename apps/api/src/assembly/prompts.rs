// Prompt templates for the model repair step.

/// Upper bound on the offending fragment quoted back to the model.
pub const MAX_FRAGMENT_CHARS: usize = 8000;

pub const REPAIR_SYSTEM: &str = "You repair malformed structured output. \
    You never add facts, never summarise, and never explain.";

/// Template for repairing one field.
/// Placeholders: {field_name}, {example}, {fragment}
pub const REPAIR_PROMPT_TEMPLATE: &str = r#"The value for the field "{field_name}" does not match its required shape.

Required shape (example):
{example}

Offending value:
{fragment}

Return ONLY corrected JSON matching the example's shape, using the information in the offending value.
Use an empty string for missing strings and an empty list for missing lists.
Do not wrap the value in the field name."#;

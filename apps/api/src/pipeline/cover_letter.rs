use serde_json::{Map, Value};

/// Joins an assembled cover letter into its final text: opening, body
/// paragraphs, company connection, closing. Blank parts are skipped.
pub fn compose_final_content(record: &Map<String, Value>) -> String {
    let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::trim);

    let body = record
        .get("body_paragraphs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim);

    text("opening_paragraph")
        .into_iter()
        .chain(body)
        .chain(text("company_connection"))
        .chain(text("closing_paragraph"))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

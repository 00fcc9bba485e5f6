//! Locates the generated text inside the differently shaped payloads that
//! generation, summarization, translation and question-answering models return.

use super::types::UpstreamPayload;
use serde_json::Value;

type ShapeMatcher = fn(&Value) -> Option<&str>;

/// Tried in order; the first matcher that recognises the payload decides the output.
const SHAPES: &[ShapeMatcher] = &[plain_string, first_list_item, keyed_object];

const LIST_ITEM_FIELDS: &[&str] = &["generated_text", "text"];

const OBJECT_FIELDS: &[&str] = &[
    "generated_text",
    "summary_text",
    "translation_text",
    "answer",
    "text",
];

/// Returns the model's text answer, or an empty string when no known shape matches.
pub fn extract_output(payload: &UpstreamPayload) -> &str {
    match payload {
        UpstreamPayload::Text(text) => text.as_str(),
        UpstreamPayload::Json(value) => SHAPES
            .iter()
            .find_map(|shape| shape(value))
            .unwrap_or_default(),
    }
}

fn plain_string(value: &Value) -> Option<&str> {
    value.as_str()
}

fn first_list_item(value: &Value) -> Option<&str> {
    let first = value.as_array()?.first()?;
    string_field(first, LIST_ITEM_FIELDS)
}

fn keyed_object(value: &Value) -> Option<&str> {
    value.as_object()?;
    string_field(value, OBJECT_FIELDS)
}

fn string_field<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| value.get(*field).and_then(Value::as_str))
}

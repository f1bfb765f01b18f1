use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::schema::VariableSchema;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("placeholder pattern compiles")
    })
}

/// Whether `name` could appear inside a `{{ }}` token.
pub fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Distinct placeholder names in first-seen order.
pub fn placeholders(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(content) {
        let name = &caps[1];
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    /// Tokens with no value, left verbatim in `content`.
    pub unresolved: Vec<String>,
}

pub fn render(content: &str, values: &Map<String, Value>) -> Rendered {
    let mut unresolved: Vec<String> = Vec::new();
    let output = placeholder_pattern().replace_all(content, |caps: &Captures<'_>| {
        let name = &caps[1];
        match values.get(name) {
            Some(value) => render_value(value),
            None => {
                if !unresolved.iter().any(|seen| seen == name) {
                    unresolved.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    Rendered {
        content: output.into_owned(),
        unresolved,
    }
}

pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Layers values lowest precedence first: schema defaults, then `derived`, then `supplied`.
pub fn merge_values(
    schema: &VariableSchema,
    derived: &Map<String, Value>,
    supplied: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for (name, spec) in schema {
        if let Some(default) = &spec.default {
            merged.insert(name.clone(), default.clone());
        }
    }
    for (name, value) in derived.iter().chain(supplied.iter()) {
        if !value.is_null() || !merged.contains_key(name) {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

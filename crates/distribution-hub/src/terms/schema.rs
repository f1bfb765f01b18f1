//! Declared template variables and the checks run against supplied values.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primitive types a template variable may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl VariableType {
    pub const fn label(self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
            VariableType::Date => "date",
        }
    }

    /// Numbers and booleans also accept their string spellings; dates must be
    /// `YYYY-MM-DD` or RFC 3339 strings.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (VariableType::String, Value::String(_)) => true,
            (VariableType::Number, Value::Number(_)) => true,
            (VariableType::Number, Value::String(raw)) => raw
                .trim()
                .parse::<f64>()
                .map(f64::is_finite)
                .unwrap_or(false),
            (VariableType::Boolean, Value::Bool(_)) => true,
            (VariableType::Boolean, Value::String(raw)) => {
                let raw = raw.trim();
                raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false")
            }
            (VariableType::Date, Value::String(raw)) => parse_date(raw).is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    #[serde(rename = "type", default)]
    pub kind: VariableType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type VariableSchema = BTreeMap<String, VariableSpec>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    pub name: String,
    pub expected: VariableType,
    pub actual: &'static str,
}

/// Every failure found for one set of values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableReport {
    pub missing: Vec<String>,
    pub type_mismatches: Vec<TypeMismatch>,
}

impl VariableReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.type_mismatches.is_empty()
    }
}

impl fmt::Display for VariableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing {}", self.missing.join(", ")));
        }
        for mismatch in &self.type_mismatches {
            parts.push(format!(
                "{} expected {} but got {}",
                mismatch.name, mismatch.expected, mismatch.actual
            ));
        }
        if parts.is_empty() {
            f.write_str("all variables valid")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

/// Checks `values` against `schema`. Values for undeclared variables are accepted as-is.
pub fn validate_variables(schema: &VariableSchema, values: &Map<String, Value>) -> VariableReport {
    let mut report = VariableReport::default();

    for (name, spec) in schema {
        match values.get(name) {
            None | Some(Value::Null) => {
                if spec.required && spec.default.is_none() {
                    report.missing.push(name.clone());
                }
            }
            Some(value) if !spec.kind.accepts(value) => {
                report.type_mismatches.push(TypeMismatch {
                    name: name.clone(),
                    expected: spec.kind,
                    actual: json_kind(value),
                });
            }
            Some(_) => {}
        }
    }

    report
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

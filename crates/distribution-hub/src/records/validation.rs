use std::collections::BTreeMap;

use serde::Serialize;

/// Field-level validation failures for a single payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} failed validation: {}", summarize(.fields))]
pub struct ValidationError {
    pub kind: &'static str,
    pub fields: BTreeMap<String, String>,
}

fn summarize(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field} {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations so callers see every problem in one response.
#[derive(Debug)]
pub struct Violations {
    kind: &'static str,
    fields: BTreeMap<String, String>,
}

impl Violations {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "is required")
    }

    pub fn require_email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(email) => self.check(email.contains('@'), field, "must contain '@'"),
            None => self,
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(
            value.is_finite() && value >= 0.0,
            field,
            "must be a finite, non-negative amount",
        )
    }

    pub fn percentage(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(
            value.is_finite() && (0.0..=100.0).contains(&value),
            field,
            "must be between 0 and 100",
        )
    }

    pub fn currency(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()),
            field,
            "must be a three-letter currency code",
        )
    }

    /// Records `message` against `field` unless `ok` holds. The first message per field wins.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.fields
                .entry(field.to_string())
                .or_insert_with(|| message.into());
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                kind: self.kind,
                fields: self.fields,
            })
        }
    }
}

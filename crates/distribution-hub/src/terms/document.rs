use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::records::{Entity, Lifecycle, RecordId, ValidationError, Violations};

/// Terms rendered for one distributor from one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsDocument {
    pub distributor_id: RecordId,
    pub template_id: RecordId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub unresolved_placeholders: Vec<String>,
    pub document_version: u32,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_by: Option<String>,
    #[serde(default)]
    pub previous_document_id: Option<RecordId>,
    #[serde(default)]
    pub terminated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Signed,
    Expired,
    Terminated,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Signed => "signed",
            DocumentStatus::Expired => "expired",
            DocumentStatus::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

impl TermsDocument {
    /// Signed and within its effective window on `day`. Open ends count as unbounded.
    pub fn in_force_on(&self, day: NaiveDate) -> bool {
        self.status == DocumentStatus::Signed
            && self.effective_date.map_or(true, |start| start <= day)
            && self.expiration_date.map_or(true, |end| day <= end)
    }
}

impl Entity for TermsDocument {
    const KIND: &'static str = "terms document";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("title", &self.title)
            .check(
                self.document_version >= 1,
                "document_version",
                "must be at least 1",
            );
        if let (Some(start), Some(end)) = (self.effective_date, self.expiration_date) {
            violations.check(
                start <= end,
                "expiration_date",
                "must not precede the effective date",
            );
        }
        if self.status == DocumentStatus::Signed {
            violations.check(
                self.signed_by
                    .as_deref()
                    .is_some_and(|signer| !signer.trim().is_empty()),
                "signed_by",
                "is required for signed documents",
            );
        }
        violations.finish()
    }
}

impl Lifecycle for TermsDocument {
    type Status = DocumentStatus;

    fn status(&self) -> DocumentStatus {
        self.status
    }

    fn can_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (from, to),
            (Draft, Signed) | (Draft, Terminated) | (Signed, Expired) | (Signed, Terminated)
        )
    }

    fn apply_status(&mut self, next: DocumentStatus, at: DateTime<Utc>) {
        self.status = next;
        match next {
            DocumentStatus::Signed => self.signed_at = Some(at),
            DocumentStatus::Terminated => self.terminated_at = Some(at),
            _ => {}
        }
    }
}

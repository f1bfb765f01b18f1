use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::schema::VariableSchema;
use super::substitution::is_placeholder_name;
use crate::partners::agency::active;
use crate::records::{
    CrudService, Entity, Record, RecordId, ServiceError, ValidationError, Violations,
};

/// Parameterized terms document with `{{placeholder}}` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub content: String,
    #[serde(default)]
    pub variables: VariableSchema,
    #[serde(default = "first_revision")]
    pub revision: String,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub approval_required: bool,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_renewal: bool,
    #[serde(default)]
    pub renewal_period_months: Option<u32>,
}

fn first_revision() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    General,
    Lending,
    Leasing,
    Privacy,
    Distribution,
    Other,
}

impl TemplateCategory {
    pub const fn label(self) -> &'static str {
        match self {
            TemplateCategory::General => "general",
            TemplateCategory::Lending => "lending",
            TemplateCategory::Leasing => "leasing",
            TemplateCategory::Privacy => "privacy",
            TemplateCategory::Distribution => "distribution",
            TemplateCategory::Other => "other",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TermsTemplate {
    pub fn is_approved(&self) -> bool {
        !self.approval_required || self.approved_at.is_some()
    }
}

impl Entity for TermsTemplate {
    const KIND: &'static str = "terms template";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("name", &self.name)
            .require("content", &self.content)
            .check(
                self.renewal_period_months.map_or(true, |months| months >= 1),
                "renewal_period_months",
                "must be at least one month",
            )
            .check(
                self.is_active || !self.is_default,
                "is_default",
                "an inactive template cannot be the default",
            );
        for name in self.variables.keys() {
            violations.check(
                is_placeholder_name(name),
                &format!("variables.{name}"),
                "may only contain letters, digits, '_' and '.'",
            );
        }
        violations.finish()
    }

    /// Approval is server-owned and survives edits that leave the text and schema alone.
    fn reconcile(&mut self, previous: Option<&Self>) {
        match previous {
            Some(previous)
                if previous.content == self.content && previous.variables == self.variables =>
            {
                self.approved_by = previous.approved_by.clone();
                self.approved_at = previous.approved_at;
            }
            _ => {
                self.approved_by = None;
                self.approved_at = None;
            }
        }
    }

    fn exclusive_scope(&self) -> Option<String> {
        (self.is_default && self.is_active).then(|| self.category.label().to_string())
    }

    fn release_exclusive(&mut self) {
        self.is_default = false;
    }
}

impl CrudService<TermsTemplate> {
    pub fn approve(
        &self,
        id: RecordId,
        approver: &str,
    ) -> Result<Record<TermsTemplate>, ServiceError> {
        let mut violations = Violations::new(TermsTemplate::KIND);
        violations.require("approved_by", approver);
        violations.finish()?;

        let record = self.modify(id, |template| {
            template.approved_by = Some(approver.trim().to_string());
            template.approved_at = Some(Utc::now());
            Ok(true)
        })?;
        info!(%id, approver, "terms template approved");
        Ok(record)
    }

    /// Makes `id` the default for its category, demoting the current default.
    pub fn set_default(&self, id: RecordId) -> Result<Record<TermsTemplate>, ServiceError> {
        let record = self.modify(id, |template| {
            if !template.is_active {
                return Err(ServiceError::Conflict(format!(
                    "terms template {id} is inactive and cannot become the default"
                )));
            }
            let promoted = !template.is_default;
            template.is_default = true;
            Ok(promoted)
        })?;
        info!(%id, category = %record.data.category, "default terms template changed");
        Ok(record)
    }

    pub fn default_for(
        &self,
        category: TemplateCategory,
    ) -> Result<Option<Record<TermsTemplate>>, ServiceError> {
        Ok(self
            .find(|template| {
                template.category == category && template.is_default && template.is_active
            })?
            .into_iter()
            .next_back())
    }
}

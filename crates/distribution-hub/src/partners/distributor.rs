use serde::{Deserialize, Serialize};

use crate::records::{Entity, ValidationError, Violations};

/// Business partner selling or leasing products through agencies and agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributor {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: DistributorStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributorStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl Distributor {
    /// Name shown on generated documents, falling back to the legal name.
    pub fn presented_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

impl Entity for Distributor {
    const KIND: &'static str = "distributor";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("name", &self.name)
            .require_email("email", self.email.as_deref());
        violations.finish()
    }
}

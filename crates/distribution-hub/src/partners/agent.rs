use serde::{Deserialize, Serialize};

use super::agency::active;
use crate::records::{Entity, RecordId, ValidationError, Violations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub distributor_id: RecordId,
    #[serde(default)]
    pub agency_id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub employee_code: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Entity for Agent {
    const KIND: &'static str = "agent";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("first_name", &self.first_name)
            .require("last_name", &self.last_name)
            .require_email("email", self.email.as_deref());
        violations.finish()
    }
}

use serde::{Deserialize, Serialize};

use crate::records::{Entity, RecordId, ValidationError, Violations};

/// Sales office operating on behalf of a distributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub distributor_id: RecordId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

pub(crate) fn active() -> bool {
    true
}

impl Entity for Agency {
    const KIND: &'static str = "agency";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("name", &self.name)
            .require("code", &self.code)
            .require_email("email", self.email.as_deref());
        violations.finish()
    }
}

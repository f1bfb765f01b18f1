use serde::{Deserialize, Serialize};

use crate::partners::agency::active;
use crate::records::{Entity, RecordId, ValidationError, Violations};

/// Item a distributor sells, leases, or finances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub distributor_id: RecordId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "active")]
    pub is_active: bool,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

impl Entity for Product {
    const KIND: &'static str = "product";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("name", &self.name)
            .require("sku", &self.sku)
            .non_negative("price", self.price)
            .currency("currency", &self.currency);
        violations.finish()
    }
}

use serde::{Deserialize, Serialize};

use crate::partners::agency::active;
use crate::records::{Entity, RecordId, ValidationError, Violations};

/// Financing terms a distributor offers for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingConfiguration {
    pub distributor_id: RecordId,
    pub product_id: RecordId,
    pub name: String,
    pub lending_type: LendingType,
    pub min_term_months: u32,
    pub max_term_months: u32,
    pub default_term_months: u32,
    pub interest_rate: f64,
    #[serde(default)]
    pub min_down_payment_percentage: f64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendingType {
    Loan,
    Lease,
    Rental,
}

impl Entity for LendingConfiguration {
    const KIND: &'static str = "lending configuration";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("name", &self.name)
            .check(
                self.min_term_months >= 1,
                "min_term_months",
                "must be at least one month",
            )
            .check(
                self.min_term_months <= self.default_term_months
                    && self.default_term_months <= self.max_term_months,
                "default_term_months",
                "must lie between min_term_months and max_term_months",
            )
            .percentage("interest_rate", self.interest_rate)
            .percentage(
                "min_down_payment_percentage",
                self.min_down_payment_percentage,
            )
            .check(
                self.is_active || !self.is_default,
                "is_default",
                "an inactive configuration cannot be the default",
            );
        violations.finish()
    }

    fn exclusive_scope(&self) -> Option<String> {
        (self.is_default && self.is_active).then(|| self.product_id.to_string())
    }

    fn release_exclusive(&mut self) {
        self.is_default = false;
    }
}

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Entity, Lifecycle, RecordId, ValidationError, Violations};

/// Financing agreement between a party and a distributor for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_number: String,
    pub distributor_id: RecordId,
    pub product_id: RecordId,
    #[serde(default)]
    pub lending_configuration_id: Option<RecordId>,
    pub party_id: String,
    #[serde(default)]
    pub agent_id: Option<RecordId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: f64,
    #[serde(default)]
    pub down_payment: f64,
    #[serde(default)]
    pub status: ContractStatus,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub terminated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Active,
    Completed,
    Terminated,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::PendingApproval => "pending_approval",
            ContractStatus::Approved => "approved",
            ContractStatus::Rejected => "rejected",
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Entity for Contract {
    const KIND: &'static str = "contract";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("contract_number", &self.contract_number)
            .require("party_id", &self.party_id)
            .check(
                self.end_date > self.start_date,
                "end_date",
                "must be after start_date",
            )
            .non_negative("monthly_payment", self.monthly_payment)
            .non_negative("down_payment", self.down_payment);
        violations.finish()
    }

    fn reconcile(&mut self, previous: Option<&Self>) {
        match previous {
            Some(previous) => {
                self.status = previous.status;
                self.approved_at = previous.approved_at;
                self.terminated_at = previous.terminated_at;
            }
            None => {
                self.status = ContractStatus::Draft;
                self.approved_at = None;
                self.terminated_at = None;
            }
        }
    }
}

impl Lifecycle for Contract {
    type Status = ContractStatus;

    fn status(&self) -> ContractStatus {
        self.status
    }

    fn can_transition(from: ContractStatus, to: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (from, to),
            (Draft, PendingApproval)
                | (Draft, Terminated)
                | (PendingApproval, Approved)
                | (PendingApproval, Rejected)
                | (PendingApproval, Draft)
                | (Approved, Active)
                | (Approved, Terminated)
                | (Active, Completed)
                | (Active, Terminated)
        )
    }

    fn apply_status(&mut self, next: ContractStatus, at: DateTime<Utc>) {
        self.status = next;
        match next {
            ContractStatus::Approved => self.approved_at = Some(at),
            ContractStatus::Terminated => self.terminated_at = Some(at),
            _ => {}
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::info;

use super::agency::active;
use crate::records::{
    CrudService, Entity, Record, RecordId, ServiceError, ValidationError, Violations,
};

/// Disbursement instrument configured for an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyPaymentMethod {
    pub agency_id: RecordId,
    pub method_type: PaymentMethodType,
    #[serde(default)]
    pub account_holder: Option<String>,
    pub account_identifier: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    BankAccount,
    DigitalWallet,
    Card,
    Check,
}

impl Entity for AgencyPaymentMethod {
    const KIND: &'static str = "agency payment method";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("account_identifier", &self.account_identifier)
            .currency("currency", &self.currency)
            .check(
                self.is_active || !self.is_primary,
                "is_primary",
                "an inactive method cannot be primary",
            );
        violations.finish()
    }

    fn exclusive_scope(&self) -> Option<String> {
        (self.is_primary && self.is_active).then(|| self.agency_id.to_string())
    }

    fn release_exclusive(&mut self) {
        self.is_primary = false;
    }
}

impl CrudService<AgencyPaymentMethod> {
    /// Marks `id` as its agency's primary method, demoting the previous one.
    pub fn set_primary(&self, id: RecordId) -> Result<Record<AgencyPaymentMethod>, ServiceError> {
        let record = self.modify(id, |method| {
            if !method.is_active {
                return Err(ServiceError::Conflict(format!(
                    "payment method {id} is inactive and cannot become primary"
                )));
            }
            let promoted = !method.is_primary;
            method.is_primary = true;
            Ok(promoted)
        })?;
        info!(agency_id = %record.data.agency_id, %id, "primary payment method changed");
        Ok(record)
    }

    pub fn primary_for(
        &self,
        agency_id: RecordId,
    ) -> Result<Option<Record<AgencyPaymentMethod>>, ServiceError> {
        Ok(self
            .find(|method| method.agency_id == agency_id && method.is_primary && method.is_active)?
            .into_iter()
            .next_back())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryRepository, PageLimits};
    use std::sync::Arc;

    fn service() -> CrudService<AgencyPaymentMethod> {
        CrudService::new(
            Arc::new(InMemoryRepository::<AgencyPaymentMethod>::default()),
            PageLimits::default(),
        )
    }

    fn method(agency_id: RecordId, account: &str, is_primary: bool) -> AgencyPaymentMethod {
        AgencyPaymentMethod {
            agency_id,
            method_type: PaymentMethodType::BankAccount,
            account_holder: Some("North Agency".to_string()),
            account_identifier: account.to_string(),
            bank_name: Some("First Bank".to_string()),
            currency: "EUR".to_string(),
            is_primary,
            is_active: true,
        }
    }

    #[test]
    fn creating_a_primary_method_demotes_the_previous_one() {
        let service = service();
        let agency = RecordId::new();
        let first = service.create(method(agency, "ES01", true)).expect("create");
        let second = service.create(method(agency, "ES02", true)).expect("create");

        assert!(!service.get(first.id).expect("fetch").data.is_primary);
        let primary = service
            .primary_for(agency)
            .expect("lookup")
            .expect("primary present");
        assert_eq!(primary.id, second.id);
    }

    #[test]
    fn primaries_are_tracked_per_agency() {
        let service = service();
        let north = RecordId::new();
        let south = RecordId::new();
        let north_primary = service.create(method(north, "N1", true)).expect("create");
        service.create(method(south, "S1", true)).expect("create");

        assert_eq!(
            service.primary_for(north).expect("lookup").map(|r| r.id),
            Some(north_primary.id)
        );
    }

    #[test]
    fn set_primary_switches_the_flag() {
        let service = service();
        let agency = RecordId::new();
        let first = service.create(method(agency, "A1", true)).expect("create");
        let second = service.create(method(agency, "A2", false)).expect("create");

        let promoted = service.set_primary(second.id).expect("promote");
        assert!(promoted.data.is_primary);
        assert!(!service.get(first.id).expect("fetch").data.is_primary);
    }

    #[test]
    fn inactive_methods_cannot_be_primary() {
        let service = service();
        let agency = RecordId::new();
        let mut inactive = method(agency, "A1", false);
        inactive.is_active = false;
        let stored = service.create(inactive.clone()).expect("create");

        assert!(matches!(
            service.set_primary(stored.id),
            Err(ServiceError::Conflict(_))
        ));

        inactive.is_primary = true;
        assert!(matches!(
            service.create(inactive),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_currency() {
        let service = service();
        let mut bad = method(RecordId::new(), "A1", false);
        bad.currency = "EURO".to_string();
        match service.create(bad) {
            Err(ServiceError::Validation(error)) => assert!(error.fields.contains_key("currency")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

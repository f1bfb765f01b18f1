use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Entity, Lifecycle, RecordId, ValidationError, Violations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub contract_id: Option<RecordId>,
    pub product_id: RecordId,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    pub shipping_address: String,
    #[serde(default)]
    pub estimated_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Preparing,
    Shipped,
    InTransit,
    Delivered,
    Returned,
    Cancelled,
}

impl ShipmentStatus {
    pub const fn has_left_warehouse(self) -> bool {
        matches!(
            self,
            ShipmentStatus::Shipped
                | ShipmentStatus::InTransit
                | ShipmentStatus::Delivered
                | ShipmentStatus::Returned
        )
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Preparing => "preparing",
            ShipmentStatus::Shipped => "shipped",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Returned => "returned",
            ShipmentStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

impl Entity for Shipment {
    const KIND: &'static str = "shipment";

    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new(Self::KIND);
        violations
            .require("shipping_address", &self.shipping_address)
            .check(
                !self.status.has_left_warehouse() || self.tracking_number.is_some(),
                "tracking_number",
                "is required once the shipment has left the warehouse",
            );
        violations.finish()
    }

    fn reconcile(&mut self, previous: Option<&Self>) {
        match previous {
            Some(previous) => {
                self.status = previous.status;
                self.shipped_at = previous.shipped_at;
                self.delivered_at = previous.delivered_at;
            }
            None => {
                self.status = ShipmentStatus::Pending;
                self.shipped_at = None;
                self.delivered_at = None;
            }
        }
    }
}

impl Lifecycle for Shipment {
    type Status = ShipmentStatus;

    fn status(&self) -> ShipmentStatus {
        self.status
    }

    fn can_transition(from: ShipmentStatus, to: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        matches!(
            (from, to),
            (Pending, Preparing)
                | (Pending, Cancelled)
                | (Preparing, Shipped)
                | (Preparing, Cancelled)
                | (Shipped, InTransit)
                | (Shipped, Delivered)
                | (Shipped, Returned)
                | (InTransit, Delivered)
                | (InTransit, Returned)
                | (Delivered, Returned)
        )
    }

    fn apply_status(&mut self, next: ShipmentStatus, at: DateTime<Utc>) {
        self.status = next;
        match next {
            ShipmentStatus::Shipped => self.shipped_at = Some(at),
            ShipmentStatus::Delivered => self.delivered_at = Some(at),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CrudService, InMemoryRepository, PageLimits, ServiceError};
    use std::sync::Arc;

    fn shipment(tracking_number: Option<&str>) -> Shipment {
        Shipment {
            contract_id: None,
            product_id: RecordId::new(),
            tracking_number: tracking_number.map(str::to_string),
            carrier: Some("DHL".to_string()),
            shipping_address: "12 Harbour Road, Porto".to_string(),
            estimated_delivery_date: None,
            status: ShipmentStatus::Pending,
            shipped_at: None,
            delivered_at: None,
        }
    }

    fn service() -> CrudService<Shipment> {
        CrudService::new(
            Arc::new(InMemoryRepository::<Shipment>::default()),
            PageLimits::default(),
        )
    }

    #[test]
    fn delivery_path_stamps_timestamps() {
        let service = service();
        let created = service.create(shipment(Some("JD0002"))).expect("create");
        for next in [
            ShipmentStatus::Preparing,
            ShipmentStatus::Shipped,
            ShipmentStatus::InTransit,
            ShipmentStatus::Delivered,
        ] {
            service.transition(created.id, next).expect("advance");
        }

        let delivered = service.get(created.id).expect("fetch");
        assert!(delivered.data.shipped_at.is_some());
        assert!(delivered.data.delivered_at.is_some());
    }

    #[test]
    fn shipping_requires_tracking_number() {
        let service = service();
        let created = service.create(shipment(None)).expect("create");
        service
            .transition(created.id, ShipmentStatus::Preparing)
            .expect("prepare");
        assert!(matches!(
            service.transition(created.id, ShipmentStatus::Shipped),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(
            service.get(created.id).expect("fetch").data.status,
            ShipmentStatus::Preparing
        );
    }

    #[test]
    fn cancelled_shipments_stay_cancelled() {
        let service = service();
        let created = service.create(shipment(None)).expect("create");
        service
            .transition(created.id, ShipmentStatus::Cancelled)
            .expect("cancel");
        assert!(matches!(
            service.transition(created.id, ShipmentStatus::Preparing),
            Err(ServiceError::InvalidTransition { .. })
        ));
    }
}

//! Products, financing configurations, contracts, and shipments.

pub mod configuration;
pub mod contract;
pub mod import;
pub mod product;
pub mod router;
pub mod shipment;

pub use configuration::{LendingConfiguration, LendingType};
pub use contract::{Contract, ContractStatus};
pub use import::{import_products, ImportError, ImportReport, RejectedRow};
pub use product::Product;
pub use router::product_import_router;
pub use shipment::{Shipment, ShipmentStatus};

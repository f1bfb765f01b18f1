//! Distributors, their agencies and agents, and agency disbursement methods.

pub mod agency;
pub mod agent;
pub mod distributor;
pub mod payment_method;
pub mod router;

pub use agency::Agency;
pub use agent::Agent;
pub use distributor::{Distributor, DistributorStatus};
pub use payment_method::{AgencyPaymentMethod, PaymentMethodType};
pub use router::payment_method_router;

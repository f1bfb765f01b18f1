//! Record management for distributor and agency networks, plus the
//! terms-and-conditions generation engine that sits on top of it.

pub mod config;
pub mod error;
pub mod hub;
pub mod lending;
pub mod partners;
pub mod records;
pub mod telemetry;
pub mod terms;

pub use hub::{Hub, HubRepositories, HubSettings};

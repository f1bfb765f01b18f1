//! Generic record storage and CRUD plumbing shared by every managed entity.

pub mod entity;
pub mod extract;
pub mod filter;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

pub use entity::{Entity, Lifecycle, Record, RecordId};
pub use extract::{ApiJson, ApiPath, RequestRejection};
pub use filter::{FilterRequest, Page, PageLimits, SortDirection};
pub use memory::InMemoryRepository;
pub use repository::{Repository, RepositoryError, SharedRepository};
pub use router::{crud_router, status_router, StatusChange};
pub use service::{CrudService, ServiceError};
pub use validation::{ValidationError, Violations};

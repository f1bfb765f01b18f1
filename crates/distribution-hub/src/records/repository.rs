use std::sync::Arc;

use super::entity::{Entity, Record, RecordId};

/// Storage abstraction so services can be exercised without a database.
pub trait Repository<E: Entity>: Send + Sync {
    fn insert(&self, record: Record<E>) -> Result<Record<E>, RepositoryError>;
    fn update(&self, record: Record<E>) -> Result<Record<E>, RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<Record<E>>, RepositoryError>;
    /// Returns `false` when no record carried `id`.
    fn delete(&self, id: RecordId) -> Result<bool, RepositoryError>;
    /// Every stored record, oldest first.
    fn list(&self) -> Result<Vec<Record<E>>, RepositoryError>;
}

pub type SharedRepository<E> = Arc<dyn Repository<E>>;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

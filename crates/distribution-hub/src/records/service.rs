use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use super::entity::{Entity, Lifecycle, Record, RecordId};
use super::filter::{self, FilterRequest, Page, PageLimits};
use super::repository::{RepositoryError, SharedRepository};
use super::validation::ValidationError;

/// Filter/create/update/delete/get over a single entity type.
///
/// Writes are serialized so a claim on an exclusive flag and the release of
/// its siblings land together.
pub struct CrudService<E: Entity> {
    repository: SharedRepository<E>,
    limits: PageLimits,
    writes: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CrudService<E> {
    pub fn new(repository: SharedRepository<E>, limits: PageLimits) -> Self {
        Self {
            repository,
            limits,
            writes: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.writes.lock().map_err(|_| {
            RepositoryError::Unavailable(format!("{} write lock poisoned", E::KIND)).into()
        })
    }

    pub fn create(&self, mut data: E) -> Result<Record<E>, ServiceError> {
        data.reconcile(None);
        data.validate()?;

        let _guard = self.write_guard()?;
        let record = self.repository.insert(Record::new(data, Utc::now()))?;
        self.release_competing_claims(&record)?;
        info!(kind = E::KIND, id = %record.id, "record created");
        Ok(record)
    }

    pub fn update(&self, id: RecordId, mut data: E) -> Result<Record<E>, ServiceError> {
        let _guard = self.write_guard()?;
        let mut record = self.get(id)?;
        data.reconcile(Some(&record.data));
        data.validate()?;

        record.data = data;
        record.touch(Utc::now());
        let record = self.repository.update(record)?;
        self.release_competing_claims(&record)?;
        info!(kind = E::KIND, id = %record.id, version = record.version, "record updated");
        Ok(record)
    }

    pub fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        if self.repository.delete(id)? {
            info!(kind = E::KIND, %id, "record deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found::<E>(id))
        }
    }

    pub fn get(&self, id: RecordId) -> Result<Record<E>, ServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found::<E>(id))
    }

    pub fn filter(&self, request: &FilterRequest) -> Result<Page<Record<E>>, ServiceError> {
        let records = self.repository.list()?;
        Ok(filter::apply(records, request, self.limits)?)
    }

    /// Every record whose payload satisfies `predicate`, oldest first.
    pub fn find<F>(&self, predicate: F) -> Result<Vec<Record<E>>, ServiceError>
    where
        F: Fn(&E) -> bool,
    {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|record| predicate(&record.data))
            .collect())
    }

    /// Applies a server-driven change to the stored record, skipping `reconcile`.
    ///
    /// `change` sees the latest stored payload and returns `false` to leave the
    /// record untouched.
    pub(crate) fn modify<F>(&self, id: RecordId, change: F) -> Result<Record<E>, ServiceError>
    where
        F: FnOnce(&mut E) -> Result<bool, ServiceError>,
    {
        let _guard = self.write_guard()?;
        let mut record = self.get(id)?;
        if !change(&mut record.data)? {
            return Ok(record);
        }

        record.data.validate()?;
        record.touch(Utc::now());
        let record = self.repository.update(record)?;
        self.release_competing_claims(&record)?;
        Ok(record)
    }

    /// Unsets the exclusive flag on every other record claiming the same scope.
    fn release_competing_claims(&self, claimant: &Record<E>) -> Result<(), ServiceError> {
        let Some(scope) = claimant.data.exclusive_scope() else {
            return Ok(());
        };

        for mut other in self.repository.list()? {
            if other.id == claimant.id || other.data.exclusive_scope().as_deref() != Some(&scope) {
                continue;
            }
            other.data.release_exclusive();
            other.touch(Utc::now());
            debug!(kind = E::KIND, id = %other.id, %scope, "released exclusive flag");
            self.repository.update(other)?;
        }

        Ok(())
    }
}

impl<E: Lifecycle> CrudService<E> {
    /// Moves a record to `next` when the entity's transition table allows it.
    pub fn transition(&self, id: RecordId, next: E::Status) -> Result<Record<E>, ServiceError> {
        let mut current = next;
        let record = self.modify(id, |data| {
            current = data.status();
            if !E::can_transition(current, next) {
                return Err(ServiceError::InvalidTransition {
                    kind: E::KIND,
                    from: current.to_string(),
                    to: next.to_string(),
                });
            }
            data.apply_status(next, Utc::now());
            Ok(true)
        })?;
        info!(kind = E::KIND, %id, from = %current, to = %next, "status changed");
        Ok(record)
    }
}

/// Error raised by record services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },
    #[error("{0}")]
    Absent(String),
    #[error("{kind} cannot move from {from} to {to}")]
    InvalidTransition {
        kind: &'static str,
        from: String,
        to: String,
    },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unable to evaluate filter: {0}")]
    Filter(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn not_found<E: Entity>(id: RecordId) -> Self {
        Self::NotFound { kind: E::KIND, id }
    }
}

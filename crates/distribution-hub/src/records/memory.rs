use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::entity::{Entity, Record, RecordId};
use super::repository::{Repository, RepositoryError};

/// Process-local repository used by the service binary and tests.
pub struct InMemoryRepository<E> {
    records: Arc<Mutex<HashMap<RecordId, Record<E>>>>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<E> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<E> InMemoryRepository<E> {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<RecordId, Record<E>>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn insert(&self, record: Record<E>) -> Result<Record<E>, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: Record<E>) -> Result<Record<E>, RepositoryError> {
        let mut guard = self.guard()?;
        match guard.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Record<E>>, RepositoryError> {
        Ok(self.guard()?.get(&id).cloned())
    }

    fn delete(&self, id: RecordId) -> Result<bool, RepositoryError> {
        Ok(self.guard()?.remove(&id).is_some())
    }

    fn list(&self) -> Result<Vec<Record<E>>, RepositoryError> {
        let mut records: Vec<_> = self.guard()?.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

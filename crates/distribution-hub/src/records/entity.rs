use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidationError;

/// Identifier shared by every stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// Stored envelope around an entity payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<E> {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
    #[serde(flatten)]
    pub data: E,
}

impl<E> Record<E> {
    pub fn new(data: E, at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            created_at: at,
            updated_at: at,
            version: 1,
            data,
        }
    }

    /// Marks the envelope as modified at `at`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
        self.version = self.version.saturating_add(1);
    }
}

/// Behavior every stored payload provides to the generic record service.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human readable name used in errors and logs.
    const KIND: &'static str;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Carries server-owned fields across writes. `previous` is `None` on create.
    fn reconcile(&mut self, _previous: Option<&Self>) {}

    /// Scope within which this record holds a flag no other record may share.
    fn exclusive_scope(&self) -> Option<String> {
        None
    }

    /// Drops the exclusive flag claimed by [`Entity::exclusive_scope`].
    fn release_exclusive(&mut self) {}
}

/// Entities whose status follows a fixed transition table.
pub trait Lifecycle: Entity {
    type Status: Copy + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn status(&self) -> Self::Status;

    fn can_transition(from: Self::Status, to: Self::Status) -> bool;

    /// Sets `next` and stamps any status-specific timestamps.
    fn apply_status(&mut self, next: Self::Status, at: DateTime<Utc>);
}

//! Single-entity cache slots owned by a process-wide [`SessionCache`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::buch::Buch;
use crate::domain::entity::SyncEntity;
use crate::domain::kunde::Kunde;

/// Shared slot holding at most one entity.
///
/// Clones share the same slot. There is no generation check: concurrent
/// writers race and the last write wins.
#[derive(Debug)]
pub struct EntitySlot<E> {
    inner: Arc<Mutex<Option<E>>>,
}

impl<E> Clone for EntitySlot<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for EntitySlot<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<E: SyncEntity> EntitySlot<E> {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the cached entity.
    pub fn get(&self) -> Option<E> {
        self.lock().clone()
    }

    /// Replace the cached entity.
    pub fn put(&self, entity: E) {
        *self.lock() = Some(entity);
    }

    /// Drop the cached entity.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Cached entity if it has `id` and a version.
    pub fn versioned(&self, id: &str) -> Option<E> {
        self.lock()
            .as_ref()
            .filter(|cached| cached.id() == Some(id) && cached.version().is_some())
            .cloned()
    }

    /// Replace the cached entity only when it has the same id as `entity`.
    pub fn refresh(&self, entity: &E) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|cached| cached.id() == entity.id()) {
            *slot = Some(entity.clone());
        }
    }

    /// Drop the cached entity when it has `id`.
    pub fn evict(&self, id: &str) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|cached| cached.id() == Some(id)) {
            *slot = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache slots for every entity type, created once at startup.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    buch: EntitySlot<Buch>,
    kunde: EntitySlot<Kunde>,
}

impl SessionCache {
    /// Fresh cache with empty slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for Buch records.
    pub fn buch(&self) -> EntitySlot<Buch> {
        self.buch.clone()
    }

    /// Slot for Kunde records.
    pub fn kunde(&self) -> EntitySlot<Kunde> {
        self.kunde.clone()
    }
}

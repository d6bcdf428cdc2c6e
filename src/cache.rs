use alloc::sync::Arc;
use parking_lot::RwLock;

use crate::{
    any::{Map, RcAny},
    key::BindingKey,
    lock::KeyedLocks,
};

#[cfg(feature = "async")]
use crate::lock::KeyedSharedLocks;

/// The singleton scope store: already-created shared instances, keyed by the
/// full binding key (type plus qualifier, so each qualifier gets its own
/// instance).
///
/// Entries are populated lazily on first resolution and live until the
/// container is discarded; there is no invalidation. The check-then-store
/// sequence is serialized per key through the creation locks, which a caller
/// acquires *before* re-checking and inserting; the map lock itself is only
/// ever held for a single read or write.
pub(crate) struct ScopeStore {
    map: RwLock<Map>,
    creation_locks: KeyedLocks,
    #[cfg(feature = "async")]
    async_creation_locks: KeyedSharedLocks,
}

impl ScopeStore {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            map: RwLock::new(Map::new()),
            creation_locks: KeyedLocks::new(),
            #[cfg(feature = "async")]
            async_creation_locks: KeyedSharedLocks::new(),
        }
    }

    #[must_use]
    pub(crate) fn get<Dep: Send + Sync + 'static>(&self, key: &BindingKey) -> Option<Arc<Dep>> {
        self.map.read().get(key).and_then(|cached| cached.clone().downcast().ok())
    }

    pub(crate) fn insert<Dep: Send + Sync + 'static>(&self, key: BindingKey, value: Arc<Dep>) -> Option<RcAny> {
        self.map.write().insert(key, value)
    }

    #[must_use]
    pub(crate) fn creation_lock(&self, key: &BindingKey) -> Arc<parking_lot::Mutex<()>> {
        self.creation_locks.get(key)
    }

    #[cfg(feature = "async")]
    #[must_use]
    pub(crate) fn async_creation_lock(&self, key: &BindingKey) -> Arc<tokio::sync::Mutex<()>> {
        self.async_creation_locks.get(key)
    }
}

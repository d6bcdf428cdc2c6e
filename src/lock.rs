use alloc::{collections::BTreeMap, sync::Arc};
use parking_lot::Mutex;

use crate::key::BindingKey;

/// Per-key creation locks backing the singleton check-then-store sequence.
///
/// Locks are exact per key, never shared between keys, so resolving one
/// singleton can never contend with an unrelated one. A lock entry lives as
/// long as the container; the set is bounded by the number of singleton
/// keys ever resolved.
pub(crate) struct KeyedLocks {
    entries: Mutex<BTreeMap<BindingKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub(crate) fn get(&self, key: &BindingKey) -> Arc<Mutex<()>> {
        self.entries.lock().entry(key.clone()).or_default().clone()
    }
}

impl Default for KeyedLocks {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "async")]
mod async_impl {
    use alloc::{collections::BTreeMap, sync::Arc};
    use parking_lot::Mutex;
    use tokio::sync::Mutex as SharedMutex;

    use crate::key::BindingKey;

    /// Async-aware counterpart of [`super::KeyedLocks`]: the creation lock
    /// releases the underlying thread while awaited, so a suspended
    /// construction never occupies a worker.
    pub(crate) struct KeyedSharedLocks {
        entries: Mutex<BTreeMap<BindingKey, Arc<SharedMutex<()>>>>,
    }

    impl KeyedSharedLocks {
        #[inline]
        #[must_use]
        pub(crate) fn new() -> Self {
            Self {
                entries: Mutex::new(BTreeMap::new()),
            }
        }

        #[must_use]
        pub(crate) fn get(&self, key: &BindingKey) -> Arc<SharedMutex<()>> {
            self.entries.lock().entry(key.clone()).or_default().clone()
        }
    }

    impl Default for KeyedSharedLocks {
        #[inline]
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(feature = "async")]
pub(crate) use async_impl::KeyedSharedLocks;

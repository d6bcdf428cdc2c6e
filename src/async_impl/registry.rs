use alloc::collections::BTreeMap;
use parking_lot::RwLock;

use super::instantiator::BoxedCloneAsyncInstantiator;
use crate::{config::Config, key::BindingKey};

#[derive(Clone)]
pub(crate) struct AsyncBindingData {
    pub(crate) instantiator: BoxedCloneAsyncInstantiator,
    pub(crate) config: Config,
}

/// Async rules live in their own table; lookups that miss fall back to the
/// sync registry.
pub(crate) struct AsyncRegistry {
    bindings: RwLock<BTreeMap<BindingKey, AsyncBindingData>>,
}

impl AsyncRegistry {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            bindings: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn insert(&self, key: BindingKey, data: AsyncBindingData) -> Option<AsyncBindingData> {
        self.bindings.write().insert(key, data)
    }

    #[must_use]
    pub(crate) fn binding(&self, key: &BindingKey) -> Option<AsyncBindingData> {
        self.bindings.read().get(key).cloned()
    }
}

use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::any::TypeId;
use parking_lot::RwLock;

use crate::{
    config::Config,
    instantiator::BoxedCloneInstantiator,
    key::{BindingKey, Qualifier},
    metadata::TypeMetadata,
};

#[derive(Clone)]
pub(crate) struct BindingData {
    pub(crate) instantiator: BoxedCloneInstantiator,
    pub(crate) config: Config,
}

/// The binding registry: explicit rules keyed by `(type, qualifier)` and the
/// metadata table for automatically constructible types.
///
/// Both tables sit behind their own lock so registration may interleave with
/// resolution; a reader can never observe a half-updated entry. Lookups
/// clone the entry out, so no lock is held while a rule runs.
pub(crate) struct Registry {
    bindings: RwLock<BTreeMap<BindingKey, BindingData>>,
    metadata: RwLock<BTreeMap<TypeId, Arc<TypeMetadata>>>,
}

impl Registry {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            bindings: RwLock::new(BTreeMap::new()),
            metadata: RwLock::new(BTreeMap::new()),
        }
    }

    /// Stores a rule for the key, overwriting any previous one. Bindings are
    /// never merged.
    pub(crate) fn insert(&self, key: BindingKey, data: BindingData) -> Option<BindingData> {
        self.bindings.write().insert(key, data)
    }

    pub(crate) fn remove(&self, key: &BindingKey) -> Option<BindingData> {
        self.bindings.write().remove(key)
    }

    #[must_use]
    pub(crate) fn binding(&self, key: &BindingKey) -> Option<BindingData> {
        self.bindings.read().get(key).cloned()
    }

    pub(crate) fn insert_metadata(&self, metadata: TypeMetadata) -> Option<Arc<TypeMetadata>> {
        self.metadata.write().insert(metadata.type_info().id, Arc::new(metadata))
    }

    #[must_use]
    pub(crate) fn metadata(&self, type_id: &TypeId) -> Option<Arc<TypeMetadata>> {
        self.metadata.read().get(type_id).cloned()
    }

    /// Whether any binding exists for the type, under any qualifier.
    #[must_use]
    pub(crate) fn has_bindings_for(&self, type_id: &TypeId) -> bool {
        self.bindings.read().keys().any(|key| key.type_info.id == *type_id)
    }

    /// Qualifiers of all qualified bindings for the type, used by the
    /// compatible-lookup fallback.
    #[must_use]
    pub(crate) fn qualified_candidates(&self, type_id: &TypeId) -> Vec<Qualifier> {
        self.bindings
            .read()
            .keys()
            .filter(|key| key.type_info.id == *type_id)
            .filter_map(|key| key.qualifier.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{BindingData, Registry};
    use crate::{
        config::Config,
        errors::InstantiateErrorKind,
        instantiator::boxed_instantiator_factory,
        key::BindingKey,
    };

    use core::any::TypeId;

    struct Request;

    fn request_binding() -> BindingData {
        BindingData {
            instantiator: boxed_instantiator_factory(|| Ok::<_, InstantiateErrorKind>(Request)),
            config: Config::default(),
        }
    }

    #[test]
    fn test_insert_overwrites() {
        let registry = Registry::new();
        let key = BindingKey::of::<Request>();

        assert!(registry.insert(key.clone(), request_binding()).is_none());
        assert!(registry.insert(key.clone(), request_binding()).is_some());
        assert!(registry.binding(&key).is_some());
    }

    #[test]
    fn test_remove() {
        let registry = Registry::new();
        let key = BindingKey::of::<Request>();

        registry.insert(key.clone(), request_binding());

        assert!(registry.remove(&key).is_some());
        assert!(registry.remove(&key).is_none());
        assert!(registry.binding(&key).is_none());
    }

    #[test]
    fn test_qualified_candidates() {
        let registry = Registry::new();
        let type_id = TypeId::of::<Request>();

        assert!(!registry.has_bindings_for(&type_id));

        registry.insert(BindingKey::qualified::<Request>("email"), request_binding());
        registry.insert(BindingKey::qualified::<Request>("sms"), request_binding());
        registry.insert(BindingKey::of::<Request>(), request_binding());

        assert!(registry.has_bindings_for(&type_id));
        assert_eq!(registry.qualified_candidates(&type_id).len(), 2);
    }
}

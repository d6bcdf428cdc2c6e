use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::any::Any;
use tracing::{debug, error, info_span};

use crate::{
    cache::ScopeStore,
    config::{Config, ContainerConfig},
    context::ResolveContext,
    dependency_resolver::DependencyResolver,
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    instantiator::{boxed_instantiator_factory, BoxedCloneInstantiator, Instantiator},
    key::{BindingKey, Qualifier},
    lazy::Lazy,
    metadata::{Injectable, TypeMetadata},
    module::{Module, ModuleInstaller},
    provider::Provider,
    registry::{BindingData, Registry},
    service::Service as _,
};

/// The dependency resolution engine.
///
/// A container is an explicit handle: it is created at startup, cloned
/// cheaply (clones share all state) and passed to every component that needs
/// resolution. Registration may interleave with resolution, though the
/// expected shape is registration up front and concurrent resolution after.
///
/// ```rust
/// use injex::{Container, InstantiateErrorKind};
///
/// struct Engine;
/// struct Car(std::sync::Arc<Engine>);
///
/// let container = Container::new();
/// container.register_singleton(|| Ok::<_, InstantiateErrorKind>(Engine));
/// container.register(|injex::Inject(engine): injex::Inject<Engine>| {
///     Ok::<_, InstantiateErrorKind>(Car(engine))
/// });
///
/// let car = container.get::<Car>().unwrap();
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Registry,
    pub(crate) cache: ScopeStore,
    pub(crate) config: ContainerConfig,
    #[cfg(feature = "async")]
    pub(crate) async_registry: crate::async_impl::registry::AsyncRegistry,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: Registry::new(),
                cache: ScopeStore::new(),
                config,
                #[cfg(feature = "async")]
                async_registry: crate::async_impl::registry::AsyncRegistry::new(),
            }),
        }
    }

    /// Registers an explicit transient binding for `Inst::Provides`.
    pub fn register<Inst, Deps>(&self, instantiator: Inst)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.register_with_config(instantiator, Config::default());
    }

    /// Registers an explicit binding under the descriptor's scope and
    /// qualifier. Re-registration under the same key overwrites.
    pub fn register_with_config<Inst, Deps>(&self, instantiator: Inst, config: Config)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        let key = BindingKey::with::<Inst::Provides>(config.qualifier.clone());
        debug!(%key, scope = %config.scope, "Binding registered");
        self.inner.registry.insert(
            key,
            BindingData {
                instantiator: boxed_instantiator_factory(instantiator),
                config,
            },
        );
    }

    /// Registers a binding that constructs once and shares the instance.
    pub fn register_singleton<Inst, Deps>(&self, instantiator: Inst)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.register_with_config(instantiator, Config::singleton());
    }

    pub fn register_qualified<Inst, Deps>(&self, instantiator: Inst, qualifier: impl Into<Qualifier>)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.register_with_config(instantiator, Config::default().qualified(qualifier));
    }

    pub fn register_singleton_qualified<Inst, Deps>(&self, instantiator: Inst, qualifier: impl Into<Qualifier>)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.register_with_config(instantiator, Config::singleton().qualified(qualifier));
    }

    /// Declares `T` eligible for automatic construction: the rule-omitted
    /// form of registration. The type's self-description is stored in the
    /// metadata table and drives every later construction.
    pub fn register_injectable<T: Injectable>(&self) {
        self.register_metadata(T::metadata());
    }

    /// Stores a hand-built metadata entry, overwriting any previous one for
    /// the same type.
    pub fn register_metadata(&self, metadata: TypeMetadata) {
        debug!(dependency = metadata.type_info().name, "Metadata registered");
        self.inner.registry.insert_metadata(metadata);
    }

    /// Removes the unqualified binding for `T`. Returns whether one existed.
    pub fn remove_binding<T: 'static>(&self) -> bool {
        self.inner.registry.remove(&BindingKey::of::<T>()).is_some()
    }

    /// Removes the qualified binding for `T`. Returns whether one existed.
    pub fn remove_binding_qualified<T: 'static>(&self, qualifier: impl Into<Qualifier>) -> bool {
        self.inner.registry.remove(&BindingKey::qualified::<T>(qualifier)).is_some()
    }

    /// Instantiates the module through the engine itself, then registers
    /// every producer it installs.
    ///
    /// The module instance comes from its explicit binding if one exists,
    /// else from its metadata entry — never from its own producers.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotInjectable`] if the module type has
    ///   neither a binding nor a metadata entry
    /// - Propagates any failure of the module's own construction
    pub fn install_module<M: Module>(&self) -> Result<(), ResolveErrorKind> {
        let key = BindingKey::of::<M>();
        let span = info_span!("install_module", module = key.type_info.name);
        let _guard = span.enter();

        if self.inner.registry.binding(&key).is_none() && self.inner.registry.metadata(&key.type_info.id).is_none() {
            let err = ResolveErrorKind::NotInjectable {
                type_info: key.type_info,
            };
            error!("{}", err);
            return Err(err);
        }

        let module = self.get::<M>()?;
        let mut installer = ModuleInstaller::new(self, M::qualifier());
        module.install(&mut installer);

        debug!("Module installed");
        Ok(())
    }

    /// Resolves the unqualified key for `Dep` per the binding's scope.
    #[allow(clippy::missing_errors_doc)]
    pub fn get<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.get_with::<Dep>(None, &[])
    }

    /// Resolves the qualified key for `Dep`.
    #[allow(clippy::missing_errors_doc)]
    pub fn get_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.get_with::<Dep>(Some(qualifier.into()), &[])
    }

    /// A non-memoizing handle for the key; each `get` re-resolves.
    #[must_use]
    pub fn provider<Dep: Send + Sync + 'static>(&self) -> Provider<Dep> {
        Provider::new(self.clone(), None)
    }

    #[must_use]
    pub fn provider_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Provider<Dep> {
        Provider::new(self.clone(), Some(qualifier.into()))
    }

    /// A memoizing deferred handle for the key; evaluated at most once.
    #[must_use]
    pub fn lazy<Dep: Send + Sync + 'static>(&self) -> Lazy<Dep> {
        Lazy::new(self.clone(), None)
    }

    #[must_use]
    pub fn lazy_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Lazy<Dep> {
        Lazy::new(self.clone(), Some(qualifier.into()))
    }
}

impl Container {
    pub(crate) fn get_with<Dep: Send + Sync + 'static>(
        &self,
        qualifier: Option<Qualifier>,
        parent_chain: &[BindingKey],
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        let key = BindingKey::with::<Dep>(qualifier);
        let span = info_span!("get", dependency = key.type_info.name, qualifier = ?key.qualifier);
        let _guard = span.enter();

        if parent_chain.contains(&key) {
            let mut chain = parent_chain.to_vec();
            chain.push(key);
            let err = ResolveErrorKind::Cyclic {
                chain: chain.into_boxed_slice(),
            };
            error!("{}", err);
            return Err(err);
        }

        let mut chain = Vec::with_capacity(parent_chain.len() + 1);
        chain.extend_from_slice(parent_chain);
        chain.push(key.clone());

        if let Some(BindingData { instantiator, config }) = self.inner.registry.binding(&key) {
            return if config.scope.is_singleton() {
                self.get_or_create(&key, || self.invoke_rule::<Dep>(instantiator, &key, &chain))
            } else {
                self.invoke_rule::<Dep>(instantiator, &key, &chain)
            };
        }
        debug!("No explicit binding");

        if let Some(metadata) = self.inner.registry.metadata(&key.type_info.id) {
            return if metadata.scope().is_singleton() {
                self.get_or_create(&key, || self.construct::<Dep>(&metadata, &key, &chain))
            } else {
                self.construct::<Dep>(&metadata, &key, &chain)
            };
        }
        debug!("No metadata entry");

        if self.inner.config.compat_lookup && key.qualifier.is_none() {
            let mut candidates = self.inner.registry.qualified_candidates(&key.type_info.id);
            if candidates.len() == 1 {
                let widened = candidates.remove(0);
                debug!(qualifier = %widened, "Widened to the only qualified binding");
                return self.get_with::<Dep>(Some(widened), parent_chain);
            }
            if candidates.len() > 1 {
                debug!("Compatible lookup skipped: several qualified candidates");
            }
        }

        let err = match key.qualifier {
            Some(qualifier) if self.inner.registry.has_bindings_for(&key.type_info.id) => ResolveErrorKind::QualifierMismatch {
                type_info: key.type_info,
                qualifier,
            },
            qualifier => ResolveErrorKind::NotFound {
                key: BindingKey {
                    type_info: key.type_info,
                    qualifier,
                },
            },
        };
        error!("{}", err);
        Err(err)
    }

    /// The singleton check-then-store sequence, serialized per key: one
    /// construction at most, concurrent callers block on the key's creation
    /// lock until the winner's instance is stored.
    fn get_or_create<Dep, F>(&self, key: &BindingKey, create: F) -> Result<Arc<Dep>, ResolveErrorKind>
    where
        Dep: Send + Sync + 'static,
        F: FnOnce() -> Result<Arc<Dep>, ResolveErrorKind>,
    {
        if let Some(cached) = self.inner.cache.get::<Dep>(key) {
            debug!("Found in cache");
            return Ok(cached);
        }
        debug!("Not found in cache");

        let lock = self.inner.cache.creation_lock(key);
        let _guard = lock.lock();

        if let Some(cached) = self.inner.cache.get::<Dep>(key) {
            debug!("Found in cache after lock");
            return Ok(cached);
        }

        let value = create()?;
        self.inner.cache.insert(key.clone(), value.clone());
        debug!("Cached");
        Ok(value)
    }

    fn invoke_rule<Dep: Send + Sync + 'static>(
        &self,
        mut instantiator: BoxedCloneInstantiator,
        key: &BindingKey,
        chain: &[BindingKey],
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        let context = ResolveContext::new(self.clone(), key.qualifier.clone(), chain.to_vec());
        match instantiator.call(context) {
            Ok(dependency) => match dependency.downcast::<Dep>() {
                Ok(dependency) => Ok(Arc::new(*dependency)),
                Err(incorrect_type) => {
                    let err = ResolveErrorKind::IncorrectType {
                        expected: key.type_info,
                        actual: (*incorrect_type).type_id(),
                    };
                    error!("{}", err);
                    Err(err)
                }
            },
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err))))
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)))
            }
        }
    }

    /// Automatic construction: designated constructor, then property
    /// injection against the still-exclusive instance, then sharing.
    fn construct<Dep: Send + Sync + 'static>(
        &self,
        metadata: &TypeMetadata,
        key: &BindingKey,
        chain: &[BindingKey],
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        let Some(mut constructor) = metadata.constructor() else {
            let err = ResolveErrorKind::NoConstructor {
                type_info: key.type_info,
            };
            error!("{}", err);
            return Err(err);
        };

        let context = ResolveContext::new(self.clone(), key.qualifier.clone(), chain.to_vec());
        let dependency = match constructor.call(context.clone()) {
            Ok(dependency) => dependency,
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                return Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err))));
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                error!("{}", err);
                return Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)));
            }
        };

        let mut dependency = match dependency.downcast::<Dep>() {
            Ok(dependency) => dependency,
            Err(incorrect_type) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: key.type_info,
                    actual: (*incorrect_type).type_id(),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        for property in metadata.properties() {
            if let Err(source) = property.inject(&mut *dependency as &mut dyn Any, &context) {
                let err = ResolveErrorKind::Injection {
                    type_info: key.type_info,
                    source,
                };
                error!("{}", err);
                return Err(err);
            }
            debug!(property = property.name, mode = property.mode.name(), "Property injected");
        }

        Ok(Arc::from(dependency))
    }
}

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::future::Future;
use tracing::{debug, error};

use super::{
    instantiator::{boxed_async_instantiator_factory, BoxedCloneAsyncInstantiator},
    provider::AsyncProvider,
    registry::AsyncBindingData,
    service::AsyncService as _,
};
use crate::{
    config::Config,
    container::Container,
    context::ResolveContext,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    key::{BindingKey, Qualifier},
};

impl Container {
    /// Registers a transient async rule for `T`.
    ///
    /// The rule receives the resolve context and may suspend, e.g. to await
    /// an external resource.
    pub fn register_async<T, F, Fut>(&self, rule: F)
    where
        T: Send + Sync + 'static,
        F: Fn(ResolveContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, InstantiateErrorKind>> + Send + 'static,
    {
        self.register_async_with_config(rule, Config::default());
    }

    /// Registers an async rule under the descriptor's scope and qualifier.
    pub fn register_async_with_config<T, F, Fut>(&self, rule: F, config: Config)
    where
        T: Send + Sync + 'static,
        F: Fn(ResolveContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, InstantiateErrorKind>> + Send + 'static,
    {
        let key = BindingKey::with::<T>(config.qualifier.clone());
        debug!(%key, scope = %config.scope, "Async binding registered");
        self.inner.async_registry.insert(
            key,
            AsyncBindingData {
                instantiator: boxed_async_instantiator_factory(rule),
                config,
            },
        );
    }

    /// Resolves through the async bindings table, falling back to the sync
    /// path when no async binding exists for the key.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_async<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.get_async_with::<Dep>(None, &[]).await
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get_async_qualified<Dep: Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.get_async_with::<Dep>(Some(qualifier.into()), &[]).await
    }

    #[must_use]
    pub fn async_provider<Dep: Send + Sync + 'static>(&self) -> AsyncProvider<Dep> {
        AsyncProvider::new(self.clone(), None)
    }

    #[must_use]
    pub fn async_provider_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> AsyncProvider<Dep> {
        AsyncProvider::new(self.clone(), Some(qualifier.into()))
    }

    pub(crate) async fn get_async_with<Dep: Send + Sync + 'static>(
        &self,
        qualifier: Option<Qualifier>,
        parent_chain: &[BindingKey],
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        let key = BindingKey::with::<Dep>(qualifier);
        // No entered span here: a span guard held across an await point would
        // pin the future to one thread.
        debug!(dependency = key.type_info.name, qualifier = ?key.qualifier, "Resolving async");

        if parent_chain.contains(&key) {
            let mut chain = parent_chain.to_vec();
            chain.push(key);
            let err = ResolveErrorKind::Cyclic {
                chain: chain.into_boxed_slice(),
            };
            error!("{}", err);
            return Err(err);
        }

        let Some(AsyncBindingData { instantiator, config }) = self.inner.async_registry.binding(&key) else {
            debug!("No async binding, falling back to sync resolution");
            let qualifier = key.qualifier;
            return self.get_with::<Dep>(qualifier, parent_chain);
        };

        let mut chain = Vec::with_capacity(parent_chain.len() + 1);
        chain.extend_from_slice(parent_chain);
        chain.push(key.clone());

        if config.scope.is_singleton() {
            if let Some(cached) = self.inner.cache.get::<Dep>(&key) {
                debug!("Found in cache");
                return Ok(cached);
            }
            debug!("Not found in cache");

            // Async-aware creation lock: suspending here yields the worker
            // instead of blocking it.
            let lock = self.inner.cache.async_creation_lock(&key);
            let _guard = lock.lock().await;

            if let Some(cached) = self.inner.cache.get::<Dep>(&key) {
                debug!("Found in cache after lock");
                return Ok(cached);
            }

            let value = self.invoke_async_rule::<Dep>(instantiator, &key, &chain).await?;
            self.inner.cache.insert(key.clone(), value.clone());
            debug!("Cached");
            Ok(value)
        } else {
            self.invoke_async_rule::<Dep>(instantiator, &key, &chain).await
        }
    }

    async fn invoke_async_rule<Dep: Send + Sync + 'static>(
        &self,
        mut instantiator: BoxedCloneAsyncInstantiator,
        key: &BindingKey,
        chain: &[BindingKey],
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        let context = ResolveContext::new(self.clone(), key.qualifier.clone(), chain.to_vec());
        match instantiator.call(context).await {
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
}

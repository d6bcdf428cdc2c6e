use alloc::{sync::Arc, vec::Vec};

use crate::{
    container::Container,
    errors::ResolveErrorKind,
    key::{BindingKey, Qualifier},
    lazy::Lazy,
    provider::Provider,
};

#[cfg(feature = "async")]
use crate::async_impl::AsyncProvider;

/// The state a construction rule runs under: the container, the ambient
/// qualifier of the resolution request being served and the chain of
/// in-flight keys used for cycle detection.
///
/// The ambient qualifier propagates into every dependency resolved through
/// [`Self::resolve`]; [`Self::resolve_qualified`] overrides it per
/// dependency, mirroring a parameter-level qualifier beating the inherited
/// one.
#[derive(Clone)]
pub struct ResolveContext {
    container: Container,
    ambient: Option<Qualifier>,
    chain: Vec<BindingKey>,
}

impl ResolveContext {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, ambient: Option<Qualifier>, chain: Vec<BindingKey>) -> Self {
        Self {
            container,
            ambient,
            chain,
        }
    }

    /// Context for a fresh top-level resolution with no ambient qualifier.
    #[inline]
    #[must_use]
    pub(crate) fn root(container: Container) -> Self {
        Self::new(container, None, Vec::new())
    }

    #[inline]
    #[must_use]
    pub(crate) fn with_ambient(mut self, ambient: Option<Qualifier>) -> Self {
        self.ambient = ambient;
        self
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The ambient qualifier inherited from the enclosing resolution request.
    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.ambient.as_ref()
    }

    /// Resolves a dependency under the ambient qualifier.
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_with::<Dep>(self.ambient.clone(), &self.chain)
    }

    /// Resolves a dependency under an explicit qualifier, overriding the
    /// ambient one.
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_with::<Dep>(Some(qualifier.into()), &self.chain)
    }

    /// A memoizing deferred handle for the ambient-qualified key.
    ///
    /// The handle starts a fresh resolution chain: deferred evaluation is a
    /// new top-level resolution, which is what lets lazy injection break
    /// dependency cycles.
    #[must_use]
    pub fn lazy<Dep: Send + Sync + 'static>(&self) -> Lazy<Dep> {
        Lazy::new(self.container.clone(), self.ambient.clone())
    }

    #[must_use]
    pub fn lazy_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Lazy<Dep> {
        Lazy::new(self.container.clone(), Some(qualifier.into()))
    }

    /// A non-memoizing handle for the ambient-qualified key.
    #[must_use]
    pub fn provider<Dep: Send + Sync + 'static>(&self) -> Provider<Dep> {
        Provider::new(self.container.clone(), self.ambient.clone())
    }

    #[must_use]
    pub fn provider_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Provider<Dep> {
        Provider::new(self.container.clone(), Some(qualifier.into()))
    }

    /// Resolves through the async bindings table, falling back to the sync
    /// path when no async binding exists.
    #[cfg(feature = "async")]
    #[allow(clippy::missing_errors_doc)]
    pub async fn resolve_async<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_async_with::<Dep>(self.ambient.clone(), &self.chain).await
    }

    #[cfg(feature = "async")]
    #[allow(clippy::missing_errors_doc)]
    pub async fn resolve_async_qualified<Dep: Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_async_with::<Dep>(Some(qualifier.into()), &self.chain).await
    }

    #[cfg(feature = "async")]
    #[must_use]
    pub fn async_provider<Dep: Send + Sync + 'static>(&self) -> AsyncProvider<Dep> {
        AsyncProvider::new(self.container.clone(), self.ambient.clone())
    }

    #[cfg(feature = "async")]
    #[must_use]
    pub fn async_provider_qualified<Dep: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> AsyncProvider<Dep> {
        AsyncProvider::new(self.container.clone(), Some(qualifier.into()))
    }
}

use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::{container::Container, errors::ResolveErrorKind, key::Qualifier};

/// Async counterpart of [`crate::Provider`]: non-memoizing, and its
/// underlying rule may suspend. `get` is a suspension point; the caller must
/// be willing to await it.
pub struct AsyncProvider<Dep> {
    container: Container,
    qualifier: Option<Qualifier>,
    _marker: PhantomData<fn() -> Dep>,
}

impl<Dep> Clone for AsyncProvider<Dep> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            qualifier: self.qualifier.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Dep: Send + Sync + 'static> AsyncProvider<Dep> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, qualifier: Option<Qualifier>) -> Self {
        Self {
            container,
            qualifier,
            _marker: PhantomData,
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_async_with::<Dep>(self.qualifier.clone(), &[]).await
    }
}

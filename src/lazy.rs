use alloc::sync::Arc;
use parking_lot::Mutex;

use crate::{container::Container, errors::ResolveErrorKind, key::Qualifier};

/// A memoizing deferred handle for a resolved value.
///
/// The first successful [`Self::get`] evaluates the underlying resolution
/// exactly once and caches the result; every later call returns the same
/// instance. The cell lock is held across the evaluation, so callers that
/// race on the first access block until the winner's value is ready and
/// then observe it — one evaluation, even under concurrent first access.
///
/// Memoization is per handle: two handles created for the same key are
/// independent, while clones of one handle share its cell. A failed
/// evaluation is not cached; the next `get` retries.
pub struct Lazy<Dep> {
    inner: Arc<LazyInner<Dep>>,
}

struct LazyInner<Dep> {
    cell: Mutex<Option<Arc<Dep>>>,
    container: Container,
    qualifier: Option<Qualifier>,
}

impl<Dep> Clone for Lazy<Dep> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Dep: Send + Sync + 'static> Lazy<Dep> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, qualifier: Option<Qualifier>) -> Self {
        Self {
            inner: Arc::new(LazyInner {
                cell: Mutex::new(None),
                container,
                qualifier,
            }),
        }
    }

    /// Returns the memoized value, evaluating the resolution on first call.
    #[allow(clippy::missing_errors_doc)]
    pub fn get(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        let mut cell = self.inner.cell.lock();
        if let Some(value) = cell.as_ref() {
            return Ok(value.clone());
        }

        let value = self.inner.container.get_with::<Dep>(self.inner.qualifier.clone(), &[])?;
        *cell = Some(value.clone());
        Ok(value)
    }

    /// Whether the handle already evaluated its resolution.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.cell.lock().is_some()
    }
}

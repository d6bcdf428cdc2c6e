use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::{container::Container, errors::ResolveErrorKind, key::Qualifier};

/// A non-memoizing deferred handle: every [`Self::get`] call re-resolves the
/// key through the container.
///
/// A transient binding therefore yields a fresh value per call, while a
/// singleton binding keeps handing out the one shared instance — the
/// provider defers, it does not change the binding's scope.
pub struct Provider<Dep> {
    container: Container,
    qualifier: Option<Qualifier>,
    _marker: PhantomData<fn() -> Dep>,
}

impl<Dep> Clone for Provider<Dep> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            qualifier: self.qualifier.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Dep: Send + Sync + 'static> Provider<Dep> {
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
    pub fn get(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.container.get_with::<Dep>(self.qualifier.clone(), &[])
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{format, string::{String, ToString}};

    use crate::{errors::InstantiateErrorKind, Container};

    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    struct Generated(u8);

    #[test]
    #[traced_test]
    fn test_fresh_value_per_call() {
        let call_count = Arc::new(AtomicU8::new(0));

        let container = Container::new();
        container.register({
            let call_count = call_count.clone();
            move || {
                let value = call_count.fetch_add(1, Ordering::SeqCst);
                Ok::<_, InstantiateErrorKind>(Generated(value))
            }
        });

        let provider = container.provider::<Generated>();

        let mut last = None;
        for expected in 0..5u8 {
            let value = provider.get().unwrap();
            assert_eq!(value.0, expected);
            if let Some(last) = last {
                assert!(!Arc::ptr_eq(&last, &value));
            }
            last = Some(value);
        }

        assert_eq!(call_count.load(Ordering::SeqCst), 5);
    }

    #[test]
    #[traced_test]
    fn test_singleton_binding_keeps_identity() {
        struct Shared;

        let container = Container::new();
        container.register_singleton(|| Ok::<_, InstantiateErrorKind>(Shared));

        let provider = container.provider::<Shared>();

        let first = provider.get().unwrap();
        let second = provider.get().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}

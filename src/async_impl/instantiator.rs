use alloc::boxed::Box;
use core::{any::Any, future::Future};
use tracing::debug;

use super::service::{async_service_fn, BoxCloneAsyncService, BoxFuture};
use crate::{
    context::ResolveContext,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
};

pub(crate) type BoxedCloneAsyncInstantiator =
    BoxCloneAsyncService<ResolveContext, Box<dyn Any + Send>, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

/// Boxes an async rule. The rule gets the resolve context and may suspend;
/// its output is type-erased the same way sync rules are.
#[must_use]
pub(crate) fn boxed_async_instantiator_factory<T, F, Fut>(instantiator: F) -> BoxedCloneAsyncInstantiator
where
    T: Send + Sync + 'static,
    F: Fn(ResolveContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, InstantiateErrorKind>> + Send + 'static,
{
    BoxCloneAsyncService(Box::new(async_service_fn(move |context: ResolveContext| {
        let instantiator = instantiator.clone();
        // The annotation drives the unsized coercion of the pinned future.
        let future: BoxFuture<Result<Box<dyn Any + Send>, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>> =
            Box::pin(async move {
                match instantiator(context).await {
                    Ok(dependency) => {
                        debug!("Instantiated");
                        Ok(Box::new(dependency) as Box<dyn Any + Send>)
                    }
                    Err(err) => Err(InstantiatorErrorKind::Factory(err)),
                }
            });
        future
    })))
}

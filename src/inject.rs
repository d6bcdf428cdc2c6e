use alloc::sync::Arc;

use crate::{
    context::ResolveContext,
    dependency_resolver::DependencyResolver,
    errors::ResolveErrorKind,
    lazy::Lazy,
    provider::Provider,
};

/// Eager extractor: resolves the dependency under the ambient qualifier of
/// the enclosing resolution request.
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolveContext) -> Result<Self, Self::Error> {
        context.resolve().map(Self)
    }
}

/// Lazy extractor: injects a memoizing deferred handle instead of the
/// resolved value. The handle is evaluated at most once, on first access.
pub struct InjectLazy<Dep>(pub Lazy<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectLazy<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolveContext) -> Result<Self, Self::Error> {
        Ok(Self(context.lazy()))
    }
}

/// Provider extractor: injects a non-memoizing handle that re-resolves its
/// key on every `get` call.
pub struct InjectProvider<Dep>(pub Provider<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectProvider<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolveContext) -> Result<Self, Self::Error> {
        Ok(Self(context.provider()))
    }
}

/// Escape hatch: hands the rule the whole [`ResolveContext`], e.g. to
/// resolve a dependency under a per-parameter qualifier override.
pub struct InjectContext(pub ResolveContext);

impl DependencyResolver for InjectContext {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolveContext) -> Result<Self, Self::Error> {
        Ok(Self(context.clone()))
    }
}

use crate::{context::ResolveContext, errors::ResolveErrorKind};

/// Anything a construction rule can take as an argument: the extractors in
/// [`crate::inject`] and tuples of them.
///
/// Dependencies resolve left-to-right in declaration order, depth-first, so
/// side effects of nested rules are observed in a deterministic sequence
/// within a single resolution call.
pub trait DependencyResolver: Sized {
    type Error: Into<ResolveErrorKind>;

    fn resolve(context: &ResolveContext) -> Result<Self, Self::Error>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver + Send, )*
        {
            type Error = ResolveErrorKind;

            #[inline]
            #[allow(unused_variables)]
            fn resolve(context: &ResolveContext) -> Result<Self, Self::Error> {
                Ok(($($ty::resolve(context).map_err(Into::into)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);

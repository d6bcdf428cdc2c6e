use alloc::boxed::Box;
use core::any::Any;
use tracing::debug;

use crate::{
    context::ResolveContext,
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    key::Qualifier,
    service::{service_fn, BoxCloneService},
};

/// A construction rule: given its resolved dependencies, produces one
/// instance of `Provides`.
///
/// Implemented for closures of up to eight dependency-extractor arguments,
/// so `|Inject(repo): Inject<Repo>| Ok(Service::new(repo))` is a valid
/// instantiator.
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

pub(crate) type BoxedCloneInstantiator =
    BoxCloneService<ResolveContext, Box<dyn Any>, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

#[must_use]
pub(crate) fn boxed_instantiator_factory<Inst, Deps>(instantiator: Inst) -> BoxedCloneInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Deps: DependencyResolver,
{
    BoxCloneService(Box::new(service_fn({
        move |context: ResolveContext| {
            let dependencies = match Deps::resolve(&context) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err.into())),
            };
            let dependency = match instantiator.clone().instantiate(dependencies) {
                Ok(dependency) => dependency,
                Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
            };

            debug!("Instantiated");

            Ok(Box::new(dependency) as _)
        }
    })))
}

/// Same as [`boxed_instantiator_factory`], but the rule runs with a fixed
/// ambient qualifier instead of inheriting the one of the request being
/// served. Module producers are registered through this: their parameters
/// inherit the module's qualifier, not the caller's.
#[must_use]
pub(crate) fn boxed_instantiator_factory_with_ambient<Inst, Deps>(
    instantiator: Inst,
    ambient: Option<Qualifier>,
) -> BoxedCloneInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Deps: DependencyResolver,
{
    BoxCloneService(Box::new(service_fn({
        move |context: ResolveContext| {
            let context = context.with_ambient(ambient.clone());
            let dependencies = match Deps::resolve(&context) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err.into())),
            };
            let dependency = match instantiator.clone().instantiate(dependencies) {
                Ok(dependency) => dependency,
                Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
            };

            debug!("Instantiated");

            Ok(Box::new(dependency) as _)
        }
    })))
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver + Send, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Wrapper to create an instantiator that just returns passed value.
/// It can be used when the value was created outside the container.
#[inline]
#[must_use]
pub fn instance<T: Clone + 'static>(val: T) -> impl Instantiator<(), Provides = T, Error = InstantiateErrorKind> {
    move || Ok(val.clone())
}

/// Creates a `Box<dyn Trait>` from a value, optionally including supertraits.
///
/// Bindings for abstractions are registered under their `Box<dyn Trait>`
/// type, and this is the shorthand for producing one.
///
/// # Syntax
/// ```text
/// boxed!(value; Trait [+ SuperTrait1 [+ SuperTrait2 ...]])
/// ```
///
/// # Examples
/// ```rust
/// use injex::boxed;
///
/// trait MessageService {}
///
/// struct EmailService;
///
/// impl MessageService for EmailService {}
///
/// // Single trait
/// let service1: Box<dyn MessageService> = boxed!(EmailService; MessageService);
///
/// // Trait with supertraits
/// let service2: Box<dyn MessageService + Send + Sync> = boxed!(EmailService; MessageService + Send + Sync);
/// ```
#[macro_export]
macro_rules! boxed {
    ($val:expr ; $tr:tt $($super_traits:tt)*) => {{
        Box::new($val) as Box<dyn $tr $($super_traits)*>
    }};
}

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{any::Any, marker::PhantomData};

use crate::{
    any::TypeInfo,
    context::ResolveContext,
    dependency_resolver::DependencyResolver,
    errors::{InjectionErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    instantiator::{boxed_instantiator_factory, BoxedCloneInstantiator, Instantiator},
    key::Qualifier,
    lazy::Lazy,
    scope::Scope,
    service::{service_fn, BoxCloneService},
};

/// Self-description of an automatically constructible type.
///
/// The engine never inspects a type at runtime; a type declares its
/// designated constructor and injectable properties once, either by hand
/// through [`TypeMetadata::builder`] or via the [`injectable!`](crate::injectable)
/// macro, and the resulting table entry drives every later construction.
pub trait Injectable: Sized + 'static {
    fn metadata() -> TypeMetadata;
}

#[derive(Clone, Copy)]
pub(crate) enum PropertyMode {
    Eager,
    Lazy,
}

impl PropertyMode {
    pub(crate) fn name(self) -> &'static str {
        match self {
            PropertyMode::Eager => "eager",
            PropertyMode::Lazy => "lazy",
        }
    }
}

#[derive(Clone)]
pub(crate) struct PropertyInjection {
    pub(crate) name: &'static str,
    pub(crate) mode: PropertyMode,
    injector: Arc<dyn Fn(&mut dyn Any, &ResolveContext) -> Result<(), InjectionErrorKind> + Send + Sync>,
}

impl PropertyInjection {
    #[inline]
    pub(crate) fn inject(&self, target: &mut dyn Any, context: &ResolveContext) -> Result<(), InjectionErrorKind> {
        (self.injector)(target, context)
    }
}

/// The per-type metadata table entry: scope marker, designated constructor
/// and the properties to fill after construction.
pub struct TypeMetadata {
    type_info: TypeInfo,
    scope: Scope,
    constructor: Option<BoxedCloneInstantiator>,
    properties: Vec<PropertyInjection>,
}

impl TypeMetadata {
    #[inline]
    #[must_use]
    pub fn builder<T: 'static>() -> TypeMetadataBuilder<T> {
        TypeMetadataBuilder {
            scope: Scope::default(),
            constructor: None,
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub(crate) fn scope(&self) -> Scope {
        self.scope
    }

    #[inline]
    #[must_use]
    pub(crate) fn constructor(&self) -> Option<BoxedCloneInstantiator> {
        self.constructor.clone()
    }

    #[inline]
    pub(crate) fn properties(&self) -> &[PropertyInjection] {
        &self.properties
    }
}

/// Builds a [`TypeMetadata`] entry for `T`.
///
/// A constructor is optional while building, but resolution of a type whose
/// entry has none fails with [`ResolveErrorKind::NoConstructor`].
pub struct TypeMetadataBuilder<T> {
    scope: Scope,
    constructor: Option<BoxedCloneInstantiator>,
    properties: Vec<PropertyInjection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> TypeMetadataBuilder<T> {
    /// Scope marker for automatic constructions of `T`.
    #[inline]
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Designated constructor as an extractor-based instantiator, e.g.
    /// `|Inject(repo): Inject<Repo>| Ok(Service::new(repo))`.
    #[must_use]
    pub fn constructor<Inst, Deps>(mut self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Provides = T> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.constructor = Some(boxed_instantiator_factory(instantiator));
        self
    }

    /// Designated constructor as a plain function of the resolve context,
    /// for constructors that need per-parameter qualifier overrides.
    #[must_use]
    pub fn constructor_fn<F>(mut self, construct: F) -> Self
    where
        F: Fn(&ResolveContext) -> Result<T, ResolveErrorKind> + Clone + Send + Sync + 'static,
    {
        self.constructor = Some(BoxCloneService(Box::new(service_fn(move |context: ResolveContext| {
            match construct(&context) {
                Ok(value) => Ok(Box::new(value) as Box<dyn Any>),
                Err(err) => Err(InstantiatorErrorKind::Deps(err)),
            }
        }))));
        self
    }

    /// Eager property: resolved under the ambient qualifier and assigned
    /// right after construction.
    #[must_use]
    pub fn property<Dep, F>(self, name: &'static str, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Arc<Dep>) + Send + Sync + 'static,
    {
        self.eager_property(name, None, move |target, dependency| {
            assign(target, dependency);
            Ok(())
        })
    }

    /// Eager property resolved under an explicit qualifier.
    #[must_use]
    pub fn property_qualified<Dep, F>(self, name: &'static str, qualifier: impl Into<Qualifier>, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Arc<Dep>) + Send + Sync + 'static,
    {
        self.eager_property(name, Some(qualifier.into()), move |target, dependency| {
            assign(target, dependency);
            Ok(())
        })
    }

    /// Eager property whose assignment may be rejected by the target, e.g. a
    /// once-cell that is already set.
    #[must_use]
    pub fn try_property<Dep, F>(self, name: &'static str, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Arc<Dep>) -> Result<(), InjectionErrorKind> + Send + Sync + 'static,
    {
        self.eager_property(name, None, assign)
    }

    /// Lazy property: a fresh memoizing [`Lazy`] handle is assigned instead
    /// of the resolved value.
    #[must_use]
    pub fn lazy_property<Dep, F>(self, name: &'static str, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Lazy<Dep>) + Send + Sync + 'static,
    {
        self.lazy_property_inner(name, None, assign)
    }

    #[must_use]
    pub fn lazy_property_qualified<Dep, F>(self, name: &'static str, qualifier: impl Into<Qualifier>, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Lazy<Dep>) + Send + Sync + 'static,
    {
        self.lazy_property_inner(name, Some(qualifier.into()), assign)
    }

    #[must_use]
    pub fn build(self) -> TypeMetadata {
        TypeMetadata {
            type_info: TypeInfo::of::<T>(),
            scope: self.scope,
            constructor: self.constructor,
            properties: self.properties,
        }
    }

    fn eager_property<Dep, F>(mut self, name: &'static str, qualifier: Option<Qualifier>, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Arc<Dep>) -> Result<(), InjectionErrorKind> + Send + Sync + 'static,
    {
        self.properties.push(PropertyInjection {
            name,
            mode: PropertyMode::Eager,
            injector: Arc::new(move |target, context| {
                let target = target
                    .downcast_mut::<T>()
                    .expect("Property injector invoked with mismatched target type");
                let dependency = match &qualifier {
                    Some(qualifier) => context.resolve_qualified::<Dep>(qualifier.clone()),
                    None => context.resolve::<Dep>(),
                }
                .map_err(|err| InjectionErrorKind::Resolve {
                    property: name,
                    source: Box::new(err),
                })?;
                assign(target, dependency)
            }),
        });
        self
    }

    fn lazy_property_inner<Dep, F>(mut self, name: &'static str, qualifier: Option<Qualifier>, assign: F) -> Self
    where
        Dep: Send + Sync + 'static,
        F: Fn(&mut T, Lazy<Dep>) + Send + Sync + 'static,
    {
        self.properties.push(PropertyInjection {
            name,
            mode: PropertyMode::Lazy,
            injector: Arc::new(move |target, context| {
                let target = target
                    .downcast_mut::<T>()
                    .expect("Property injector invoked with mismatched target type");
                let handle = match &qualifier {
                    Some(qualifier) => context.lazy_qualified::<Dep>(qualifier.clone()),
                    None => context.lazy::<Dep>(),
                };
                assign(target, handle);
                Ok(())
            }),
        });
        self
    }
}

/// Implements [`Injectable`] for a type from a compact description of its
/// designated constructor and injectable properties.
///
/// Constructor arguments and properties resolve under the ambient qualifier
/// unless a `["name"]` override follows their type. Properties are filled
/// after construction: `inject` assigns `Some(resolved)` to an
/// `Option<Arc<_>>` field, `inject lazy` assigns `Some(handle)` to an
/// `Option<Lazy<_>>` field.
///
/// ```text
/// injectable! {
///     NotificationService {
///         scope: Singleton,
///         new(email: EmailService ["email"], sms: SmsService),
///         inject audit: AuditLog,
///         inject lazy report: ReportGenerator ["daily"],
///     }
/// }
/// ```
#[macro_export]
macro_rules! injectable {
    // Internal rules first so the public arm's `ty` fragment never sees them.
    // Constructor argument accumulation, qualified then ambient.
    (@ctor $ty:ty, $ctor:ident, $ctx:ident, [$($done:expr,)*],) => {
        <$ty>::$ctor($($done),*)
    };
    (@ctor $ty:ty, $ctor:ident, $ctx:ident, [$($done:expr,)*], $arg:ident : $dep:ty [$q:literal] $(, $($rest:tt)*)?) => {
        $crate::injectable!(@ctor $ty, $ctor, $ctx, [$($done,)* $ctx.resolve_qualified::<$dep>($q)?,], $($($rest)*)?)
    };
    (@ctor $ty:ty, $ctor:ident, $ctx:ident, [$($done:expr,)*], $arg:ident : $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@ctor $ty, $ctor, $ctx, [$($done,)* $ctx.resolve::<$dep>()?,], $($($rest)*)?)
    };

    // Property accumulation, lazy arms before eager ones.
    (@props $builder:expr, $ty:ty $(,)?) => {
        $builder.build()
    };
    (@props $builder:expr, $ty:ty, inject lazy $field:ident : $dep:ty [$q:literal] $(, $($rest:tt)*)?) => {
        $crate::injectable!(@props
            $builder.lazy_property_qualified::<$dep, _>(::core::stringify!($field), $q, |target: &mut $ty, handle| {
                target.$field = ::core::option::Option::Some(handle);
            }),
            $ty, $($($rest)*)?)
    };
    (@props $builder:expr, $ty:ty, inject lazy $field:ident : $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@props
            $builder.lazy_property::<$dep, _>(::core::stringify!($field), |target: &mut $ty, handle| {
                target.$field = ::core::option::Option::Some(handle);
            }),
            $ty, $($($rest)*)?)
    };
    (@props $builder:expr, $ty:ty, inject $field:ident : $dep:ty [$q:literal] $(, $($rest:tt)*)?) => {
        $crate::injectable!(@props
            $builder.property_qualified::<$dep, _>(::core::stringify!($field), $q, |target: &mut $ty, dependency| {
                target.$field = ::core::option::Option::Some(dependency);
            }),
            $ty, $($($rest)*)?)
    };
    (@props $builder:expr, $ty:ty, inject $field:ident : $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@props
            $builder.property::<$dep, _>(::core::stringify!($field), |target: &mut $ty, dependency| {
                target.$field = ::core::option::Option::Some(dependency);
            }),
            $ty, $($($rest)*)?)
    };

    (
        $ty:ty {
            scope: $scope:ident,
            $ctor:ident ( $($args:tt)* ) $(, $($props:tt)*)?
        }
    ) => {
        impl $crate::Injectable for $ty {
            fn metadata() -> $crate::TypeMetadata {
                let builder = $crate::TypeMetadata::builder::<$ty>();
                let builder = builder.scope($crate::Scope::$scope);
                let builder = builder.constructor_fn(|ctx: &$crate::ResolveContext| {
                    ::core::result::Result::Ok($crate::injectable!(@ctor $ty, $ctor, ctx, [], $($args)*))
                });
                $crate::injectable!(@props builder, $ty, $($($props)*)?)
            }
        }
    };

    (
        $ty:ty {
            $ctor:ident ( $($args:tt)* ) $(, $($props:tt)*)?
        }
    ) => {
        impl $crate::Injectable for $ty {
            fn metadata() -> $crate::TypeMetadata {
                let builder = $crate::TypeMetadata::builder::<$ty>();
                let builder = builder.constructor_fn(|ctx: &$crate::ResolveContext| {
                    ::core::result::Result::Ok($crate::injectable!(@ctor $ty, $ctor, ctx, [], $($args)*))
                });
                $crate::injectable!(@props builder, $ty, $($($props)*)?)
            }
        }
    };
}

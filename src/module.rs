use alloc::sync::Arc;
use tracing::debug;

use crate::{
    config::Config,
    container::Container,
    dependency_resolver::DependencyResolver,
    instantiator::{boxed_instantiator_factory, boxed_instantiator_factory_with_ambient, Instantiator},
    key::{BindingKey, Qualifier},
    registry::BindingData,
};

/// A factory type whose producers each contribute one binding.
///
/// The module is instantiated exactly once per [`Container::install_module`]
/// call, through the engine itself, and its producers are ordinary
/// instantiator closures capturing the module instance:
///
/// ```rust
/// use std::sync::Arc;
/// use injex::{InstantiateErrorKind, Module, ModuleInstaller, Qualifier};
///
/// struct UserRepository;
/// struct UserModule;
///
/// impl Module for UserModule {
///     fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
///         installer.provide(|| Ok::<_, InstantiateErrorKind>(UserRepository));
///     }
/// }
/// ```
pub trait Module: Send + Sync + 'static {
    /// The module's ambient qualifier: producer parameters inherit it unless
    /// they override per parameter.
    #[must_use]
    fn qualifier() -> Option<Qualifier>
    where
        Self: Sized,
    {
        None
    }

    fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>);
}

/// Registration surface handed to [`Module::install`].
///
/// Every producer binding registered through it runs with the module's
/// qualifier as ambient, so a producer's parameters resolve under the
/// module's qualifier by default.
pub struct ModuleInstaller<'a> {
    container: &'a Container,
    qualifier: Option<Qualifier>,
}

impl<'a> ModuleInstaller<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: &'a Container, qualifier: Option<Qualifier>) -> Self {
        Self { container, qualifier }
    }

    /// Registers a transient, unqualified producer binding.
    pub fn provide<Inst, Deps>(&mut self, producer: Inst)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.provide_with_config(producer, Config::default());
    }

    /// Registers a producer binding under the descriptor's scope and
    /// qualifier.
    ///
    /// When the module declares a qualifier, the producer's parameters
    /// resolve under it; otherwise they inherit the producer's own binding
    /// qualifier. A per-parameter override always wins over either.
    pub fn provide_with_config<Inst, Deps>(&mut self, producer: Inst, config: Config)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        let key = BindingKey::with::<Inst::Provides>(config.qualifier.clone());
        let instantiator = match &self.qualifier {
            Some(qualifier) => boxed_instantiator_factory_with_ambient(producer, Some(qualifier.clone())),
            None => boxed_instantiator_factory(producer),
        };
        debug!(%key, scope = %config.scope, "Producer registered");
        self.container.inner.registry.insert(key, BindingData { instantiator, config });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{format, string::{String, ToString}};

    use super::{Module, ModuleInstaller};
    use crate::{
        boxed,
        config::Config,
        errors::{InstantiateErrorKind, ResolveErrorKind},
        inject::Inject,
        metadata::{Injectable, TypeMetadata},
        key::Qualifier,
        Container,
    };

    use alloc::{boxed::Box, sync::Arc};
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    struct UserRepository;
    struct UserService(#[allow(dead_code)] Arc<UserRepository>);

    struct UserModule;

    impl Injectable for UserModule {
        fn metadata() -> TypeMetadata {
            TypeMetadata::builder::<Self>()
                .constructor(|| Ok::<_, InstantiateErrorKind>(UserModule))
                .build()
        }
    }

    impl Module for UserModule {
        fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
            installer.provide_with_config(|| Ok::<_, InstantiateErrorKind>(UserRepository), Config::singleton());
            installer.provide(|Inject(repo): Inject<UserRepository>| Ok::<_, InstantiateErrorKind>(UserService(repo)));
        }
    }

    #[test]
    #[traced_test]
    fn test_module_installation() {
        let container = Container::new();
        container.register_injectable::<UserModule>();
        container.install_module::<UserModule>().unwrap();

        assert!(container.get::<UserService>().is_ok());

        let repo_1 = container.get::<UserRepository>().unwrap();
        let repo_2 = container.get::<UserRepository>().unwrap();
        assert!(Arc::ptr_eq(&repo_1, &repo_2));
    }

    #[test]
    #[traced_test]
    fn test_module_without_binding_or_metadata_fails() {
        struct OpaqueModule;

        impl Module for OpaqueModule {
            fn install(self: Arc<Self>, _installer: &mut ModuleInstaller<'_>) {}
        }

        let container = Container::new();

        assert!(matches!(
            container.install_module::<OpaqueModule>(),
            Err(ResolveErrorKind::NotInjectable { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_module_instantiated_once_per_install() {
        struct CountedModule;

        static INSTANTIATIONS: AtomicU8 = AtomicU8::new(0);

        impl Module for CountedModule {
            fn install(self: Arc<Self>, _installer: &mut ModuleInstaller<'_>) {}
        }

        let container = Container::new();
        container.register(|| {
            INSTANTIATIONS.fetch_add(1, Ordering::SeqCst);
            Ok::<_, InstantiateErrorKind>(CountedModule)
        });

        container.install_module::<CountedModule>().unwrap();
        container.install_module::<CountedModule>().unwrap();

        assert_eq!(INSTANTIATIONS.load(Ordering::SeqCst), 2);
    }

    trait MessageService: Send + Sync {
        fn message(&self) -> &'static str;
    }

    struct EmailService;
    struct SmsService;

    impl MessageService for EmailService {
        fn message(&self) -> &'static str {
            "Email message"
        }
    }

    impl MessageService for SmsService {
        fn message(&self) -> &'static str {
            "SMS message"
        }
    }

    struct MessagingModule;

    impl Injectable for MessagingModule {
        fn metadata() -> TypeMetadata {
            TypeMetadata::builder::<Self>()
                .constructor(|| Ok::<_, InstantiateErrorKind>(MessagingModule))
                .build()
        }
    }

    impl Module for MessagingModule {
        fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
            installer.provide_with_config(
                || Ok::<_, InstantiateErrorKind>(boxed!(EmailService; MessageService)),
                Config::new().qualified("email"),
            );
            installer.provide_with_config(
                || Ok::<_, InstantiateErrorKind>(boxed!(SmsService; MessageService)),
                Config::new().qualified("sms"),
            );
        }
    }

    #[test]
    #[traced_test]
    fn test_producers_under_distinct_qualifiers() {
        let container = Container::new();
        container.register_injectable::<MessagingModule>();
        container.install_module::<MessagingModule>().unwrap();

        let email = container.get_qualified::<Box<dyn MessageService>>("email").unwrap();
        let sms = container.get_qualified::<Box<dyn MessageService>>("sms").unwrap();

        assert_eq!(email.message(), "Email message");
        assert_eq!(sms.message(), "SMS message");
    }

    struct Transport(&'static str);
    struct Courier(&'static str);

    struct SmsTransportModule;

    impl Injectable for SmsTransportModule {
        fn metadata() -> TypeMetadata {
            TypeMetadata::builder::<Self>()
                .constructor(|| Ok::<_, InstantiateErrorKind>(SmsTransportModule))
                .build()
        }
    }

    impl Module for SmsTransportModule {
        fn qualifier() -> Option<Qualifier> {
            Some("sms".into())
        }

        fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
            // Unqualified binding whose parameter inherits the module qualifier.
            installer.provide(|Inject(transport): Inject<Transport>| Ok::<_, InstantiateErrorKind>(Courier(transport.0)));
        }
    }

    #[test]
    #[traced_test]
    fn test_module_qualifier_is_ambient_for_producer_parameters() {
        let container = Container::new();
        container.register_qualified(|| Ok::<_, InstantiateErrorKind>(Transport("smtp")), "email");
        container.register_qualified(|| Ok::<_, InstantiateErrorKind>(Transport("gsm")), "sms");
        container.register_injectable::<SmsTransportModule>();
        container.install_module::<SmsTransportModule>().unwrap();

        assert_eq!(container.get::<Courier>().unwrap().0, "gsm");
    }
}

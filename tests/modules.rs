use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use injex::{
    boxed, instance, Config, Container, Inject, InstantiateErrorKind, Module, ModuleInstaller, ResolveErrorKind, TypeMetadata,
};
use tracing_test::traced_test;

trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;
}

struct StripeGateway;
struct PaypalGateway;

impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }
}

impl PaymentGateway for PaypalGateway {
    fn name(&self) -> &'static str {
        "paypal"
    }
}

struct CheckoutService {
    gateway: Arc<Box<dyn PaymentGateway>>,
}

struct PaymentModule;

impl injex::Injectable for PaymentModule {
    fn metadata() -> TypeMetadata {
        TypeMetadata::builder::<Self>()
            .constructor(|| Ok::<_, InstantiateErrorKind>(PaymentModule))
            .build()
    }
}

impl Module for PaymentModule {
    fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
        installer.provide_with_config(
            || Ok::<_, InstantiateErrorKind>(boxed!(StripeGateway; PaymentGateway)),
            Config::new().qualified("stripe"),
        );
        installer.provide_with_config(
            || Ok::<_, InstantiateErrorKind>(boxed!(PaypalGateway; PaymentGateway)),
            Config::new().qualified("paypal"),
        );
        installer.provide_with_config(
            |Inject(gateway): Inject<Box<dyn PaymentGateway>>| Ok::<_, InstantiateErrorKind>(CheckoutService { gateway }),
            Config::new().qualified("stripe"),
        );
    }
}

#[test]
#[traced_test]
fn test_producers_resolve_under_their_qualifiers() {
    let container = Container::new();
    container.register_injectable::<PaymentModule>();
    container.install_module::<PaymentModule>().unwrap();

    let stripe = container.get_qualified::<Box<dyn PaymentGateway>>("stripe").unwrap();
    let paypal = container.get_qualified::<Box<dyn PaymentGateway>>("paypal").unwrap();

    assert_eq!(stripe.name(), "stripe");
    assert_eq!(paypal.name(), "paypal");
}

#[test]
#[traced_test]
fn test_producer_parameters_inherit_binding_qualifier() {
    let container = Container::new();
    container.register_injectable::<PaymentModule>();
    container.install_module::<PaymentModule>().unwrap();

    // The checkout binding is qualified "stripe", so its gateway parameter
    // resolves under "stripe" as well.
    let checkout = container.get_qualified::<CheckoutService>("stripe").unwrap();
    assert_eq!(checkout.gateway.name(), "stripe");
}

#[test]
#[traced_test]
fn test_module_resolved_through_explicit_binding() {
    static INSTALLS: AtomicU8 = AtomicU8::new(0);

    struct ConfiguredModule {
        flavor: &'static str,
    }

    impl Module for ConfiguredModule {
        fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
            INSTALLS.fetch_add(1, Ordering::SeqCst);
            let flavor = self.flavor;
            installer.provide(move || Ok::<_, InstantiateErrorKind>(flavor));
        }
    }

    let container = Container::new();
    container.register(|| {
        Ok::<_, InstantiateErrorKind>(ConfiguredModule { flavor: "production" })
    });
    container.install_module::<ConfiguredModule>().unwrap();

    assert_eq!(INSTALLS.load(Ordering::SeqCst), 1);
    assert_eq!(*container.get::<&'static str>().unwrap(), "production");
}

#[test]
#[traced_test]
fn test_module_without_construction_path_is_rejected() {
    struct BareModule;

    impl Module for BareModule {
        fn install(self: Arc<Self>, _installer: &mut ModuleInstaller<'_>) {}
    }

    let container = Container::new();

    assert!(matches!(
        container.install_module::<BareModule>(),
        Err(ResolveErrorKind::NotInjectable { .. })
    ));
    assert!(container.get::<BareModule>().is_err());
}

#[test]
#[traced_test]
fn test_producer_overwrites_existing_binding() {
    struct SwapModule;

    impl Module for SwapModule {
        fn install(self: Arc<Self>, installer: &mut ModuleInstaller<'_>) {
            installer.provide(|| Ok::<_, InstantiateErrorKind>(2u8));
        }
    }

    let container = Container::new();
    container.register(instance(1u8));
    container.register(|| Ok::<_, InstantiateErrorKind>(SwapModule));
    assert_eq!(*container.get::<u8>().unwrap(), 1);

    container.install_module::<SwapModule>().unwrap();
    assert_eq!(*container.get::<u8>().unwrap(), 2);
}

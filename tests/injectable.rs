use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use injex::{injectable, Container, InstantiateErrorKind, Lazy, ResolveErrorKind};
use tracing_test::traced_test;

static REPORT_BUILDS: AtomicU8 = AtomicU8::new(0);

struct EmailGateway;
struct SmsGateway;
struct AuditLog;

struct ReportGenerator;

injectable! {
    EmailGateway {
        new(),
    }
}

injectable! {
    SmsGateway {
        new(),
    }
}

injectable! {
    AuditLog {
        scope: Singleton,
        new(),
    }
}

impl EmailGateway {
    fn new() -> Self {
        Self
    }
}

impl SmsGateway {
    fn new() -> Self {
        Self
    }
}

impl AuditLog {
    fn new() -> Self {
        Self
    }
}

impl ReportGenerator {
    fn new() -> Self {
        REPORT_BUILDS.fetch_add(1, Ordering::SeqCst);
        Self
    }
}

injectable! {
    ReportGenerator {
        new(),
    }
}

struct NotificationService {
    email: Arc<EmailGateway>,
    sms: Arc<SmsGateway>,
    audit: Option<Arc<AuditLog>>,
    report: Option<Lazy<ReportGenerator>>,
}

impl NotificationService {
    fn new(email: Arc<EmailGateway>, sms: Arc<SmsGateway>) -> Self {
        Self {
            email,
            sms,
            audit: None,
            report: None,
        }
    }
}

injectable! {
    NotificationService {
        new(email: EmailGateway ["email"], sms: SmsGateway),
        inject audit: AuditLog,
        inject lazy report: ReportGenerator,
    }
}

fn notification_container() -> Container {
    let container = Container::new();
    container.register_qualified(|| Ok::<_, InstantiateErrorKind>(EmailGateway::new()), "email");
    container.register_injectable::<SmsGateway>();
    container.register_injectable::<AuditLog>();
    container.register_injectable::<ReportGenerator>();
    container.register_injectable::<NotificationService>();
    container
}

#[test]
#[traced_test]
fn test_constructor_with_qualifier_override() {
    let container = notification_container();

    let service = container.get::<NotificationService>().unwrap();
    let _ = (&service.email, &service.sms);
}

#[test]
#[traced_test]
fn test_eager_property_is_filled() {
    let container = notification_container();

    let service = container.get::<NotificationService>().unwrap();
    assert!(service.audit.is_some());

    // The audit log is singleton-scoped metadata, so both services share it.
    let other = container.get::<NotificationService>().unwrap();
    assert!(Arc::ptr_eq(
        service.audit.as_ref().unwrap(),
        other.audit.as_ref().unwrap()
    ));
}

#[test]
#[traced_test]
fn test_lazy_property_defers_until_first_access() {
    let container = notification_container();

    let service = container.get::<NotificationService>().unwrap();
    let before = REPORT_BUILDS.load(Ordering::SeqCst);

    let report = service.report.as_ref().unwrap();
    let first = report.get().unwrap();
    let second = report.get().unwrap();

    assert_eq!(REPORT_BUILDS.load(Ordering::SeqCst), before + 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
#[traced_test]
fn test_unregistered_dependency_fails_resolution() {
    let container = Container::new();
    container.register_injectable::<NotificationService>();

    // The qualified EmailGateway binding is missing, so construction aborts.
    assert!(matches!(
        container.get::<NotificationService>(),
        Err(ResolveErrorKind::Instantiator(_))
    ));
}

struct Transport(&'static str);
struct Courier {
    transport: Arc<Transport>,
}

impl Courier {
    fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

injectable! {
    Courier {
        new(transport: Transport),
    }
}

#[test]
#[traced_test]
fn test_ambient_qualifier_reaches_constructor_arguments() {
    let container = Container::new();
    container.register_qualified(|| Ok::<_, InstantiateErrorKind>(Transport("smtp")), "email");
    container.register_qualified(|| Ok::<_, InstantiateErrorKind>(Transport("gsm")), "sms");
    container.register_injectable::<Courier>();

    let email_courier = container.get_qualified::<Courier>("email").unwrap();
    let sms_courier = container.get_qualified::<Courier>("sms").unwrap();

    assert_eq!(email_courier.transport.0, "smtp");
    assert_eq!(sms_courier.transport.0, "gsm");
}

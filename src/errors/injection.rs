use alloc::boxed::Box;

use super::dependency_resolver::ResolveErrorKind;
use crate::any::TypeInfo;

/// Failure while filling an injectable property after construction.
///
/// A failed property aborts the whole resolution: the partially-injected
/// instance is never returned and never cached.
#[derive(thiserror::Error, Debug)]
pub enum InjectionErrorKind {
    #[error("Property `{property}` of `{type_info}` rejected assignment")]
    Rejected { type_info: TypeInfo, property: &'static str },
    #[error("Failed to resolve property `{property}`: {source}")]
    Resolve {
        property: &'static str,
        source: Box<ResolveErrorKind>,
    },
}

use alloc::boxed::Box;
use core::any::TypeId;

use super::{injection::InjectionErrorKind, instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::{
    any::TypeInfo,
    key::{BindingKey, Qualifier},
};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding found for `{key}`")]
    NotFound { key: BindingKey },
    #[error(
        "\
        No binding found for `{type_info}` with qualifier `{qualifier}`, \
        but the type has bindings under other keys\
        "
    )]
    QualifierMismatch { type_info: TypeInfo, qualifier: Qualifier },
    #[error("Type `{type_info}` has no metadata entry, so it can't be constructed automatically")]
    NotInjectable { type_info: TypeInfo },
    #[error("Metadata for `{type_info}` declares no constructor")]
    NoConstructor { type_info: TypeInfo },
    #[error("Cyclic dependency detected: {chain:?}")]
    Cyclic { chain: Box<[BindingKey]> },
    #[error("Incorrect instantiator provides type. Actual: {actual:?}, expected: {expected:?}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
    #[error("Property injection failed for `{type_info}`: {source}")]
    Injection {
        type_info: TypeInfo,
        source: InjectionErrorKind,
    },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}

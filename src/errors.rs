mod dependency_resolver;
mod injection;
mod instantiate;
mod instantiator;

pub use dependency_resolver::ResolveErrorKind;
pub use injection::InjectionErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;

pub type InstantiatorResult<T> = Result<T, InstantiateErrorKind>;

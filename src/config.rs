use crate::{key::Qualifier, scope::Scope};

/// Binding descriptor supplied at registration.
/// ## Fields
/// - `scope`:
///   Whether the instance provided by the instantiator is constructed once
///   and shared (`Singleton`) or constructed per resolution (`Transient`).
/// - `qualifier`:
///   Narrows the key the binding is registered under. A binding registered
///   with a qualifier only serves requests carrying the same qualifier.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scope: Scope,
    pub qualifier: Option<Qualifier>,
}

impl Config {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn singleton() -> Self {
        Self {
            scope: Scope::Singleton,
            qualifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[inline]
    #[must_use]
    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Engine-wide options.
/// ## Fields
/// - `compat_lookup`:
///   Enables the compatible-lookup relaxation: an unqualified request that
///   has no exact binding and no metadata entry may fall back to a qualified
///   binding of the same type, but only when exactly one such binding exists.
///   Exact matches always win and a qualified request never widens.
///
///   Off by default: with it disabled the engine fails such requests instead
///   of guessing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerConfig {
    pub compat_lookup: bool,
}

impl ContainerConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_compat_lookup(mut self) -> Self {
        self.compat_lookup = true;
        self
    }
}

use core::fmt::{self, Display, Formatter};

/// The cardinality policy for a binding's instances.
///
/// `Singleton` bindings are constructed once and the instance is shared by
/// every subsequent resolution of the same key. `Transient` bindings (the
/// default) construct a fresh instance on every resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    #[default]
    Transient,
    Singleton,
}

impl Scope {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Transient => "transient",
            Scope::Singleton => "singleton",
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_singleton(self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

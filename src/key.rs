use alloc::{
    borrow::Cow,
    string::String,
};
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// A string discriminator that narrows which binding satisfies a request
/// for an otherwise-ambiguous type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qualifier(Cow<'static, str>);

impl Qualifier {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Qualifier {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Qualifier {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a dependency slot: a type plus an optional qualifier.
///
/// An unqualified key is distinct from every qualified one, so
/// `(MessageService, None)`, `(MessageService, "email")` and
/// `(MessageService, "sms")` are three independent slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BindingKey {
    pub type_info: TypeInfo,
    pub qualifier: Option<Qualifier>,
}

impl BindingKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn qualified<T: ?Sized + 'static>(qualifier: impl Into<Qualifier>) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Some(qualifier.into()),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn with<T: ?Sized + 'static>(qualifier: Option<Qualifier>) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier,
        }
    }
}

impl Display for BindingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{} [\"{qualifier}\"]", self.type_info),
            None => write!(f, "{}", self.type_info),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{BindingKey, Qualifier};

    use alloc::{format, string::ToString as _};

    struct Service;

    #[test]
    fn test_unqualified_distinct_from_qualified() {
        let plain = BindingKey::of::<Service>();
        let email = BindingKey::qualified::<Service>("email");
        let sms = BindingKey::qualified::<Service>("sms");

        assert_ne!(plain, email);
        assert_ne!(email, sms);
        assert_eq!(email, BindingKey::qualified::<Service>("email".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BindingKey::of::<Service>()), "Service");
        assert_eq!(format!("{}", BindingKey::qualified::<Service>("email")), "Service [\"email\"]");
    }

    #[test]
    fn test_qualifier_from_owned_and_borrowed() {
        let borrowed = Qualifier::from("email");
        let owned = Qualifier::from("email".to_string());
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.as_str(), "email");
    }
}

use super::dependency_resolver::ResolveErrorKind;

/// Failure raised by a user-supplied construction rule.
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

/// Lets context-based rules bubble resolution failures with `?`.
impl From<ResolveErrorKind> for InstantiateErrorKind {
    fn from(err: ResolveErrorKind) -> Self {
        Self::Custom(anyhow::Error::new(err))
    }
}

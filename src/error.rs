//! Error types.
//!
//! [`portage_atom::Error`] says what is wrong with a dependency string or an
//! atom, without knowing which package it came from. [`Error`] wraps it with
//! the offending package, the dependency variable and the raw string so that
//! a caller can report (or skip) the corrupt record.

use thiserror::Error;

use crate::identity::PackageIdentity;
use crate::metadata::DepClass;

/// Result type for reverse-dependency queries.
pub type Result<T> = std::result::Result<T, Error>;

/// A single atom token that is not a valid package reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed atom '{token}': {source}")]
pub struct AtomError {
    /// The token as given.
    pub token: String,
    #[source]
    pub source: portage_atom::Error,
}

/// Error raised while scanning a package's dependency data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The dependency string of `package` is malformed: bad group syntax or
    /// an atom that does not name a package.
    #[error("{package}: invalid {class} '{raw}': {source}")]
    Parse {
        package: PackageIdentity,
        class: DepClass,
        raw: String,
        #[source]
        source: portage_atom::Error,
    },

    /// A query target that is not a `category/name` package.
    #[error("invalid package identity '{0}'")]
    InvalidIdentity(String),
}

impl Error {
    /// The package whose metadata triggered the error, if any.
    pub fn package(&self) -> Option<&PackageIdentity> {
        match self {
            Error::Parse { package, .. } => Some(package),
            Error::InvalidIdentity(_) => None,
        }
    }
}

//! Package identities.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use portage_atom::{Cpn, Cpv};

use crate::error::Error;

/// A package in the universe, identified by its category/package name and,
/// when known, its full versioned form.
///
/// Equality, hashing and ordering use the full form (`cat/pkg-1.0` and
/// `cat/pkg-2.0` are distinct packages). Dependency matching uses only
/// [`cpn`](Self::cpn).
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    cpn: Cpn,
    cpv: Option<Cpv>,
    key: String,
}

impl PackageIdentity {
    /// Identity for a concrete package version.
    pub fn from_cpv(cpv: Cpv) -> Self {
        Self {
            cpn: cpv.cpn,
            key: cpv.to_string(),
            cpv: Some(cpv),
        }
    }

    /// Unversioned identity.
    pub fn from_cpn(cpn: Cpn) -> Self {
        Self {
            key: cpn.to_string(),
            cpn,
            cpv: None,
        }
    }

    /// Parse either `category/name-version` or plain `category/name`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if let Ok(cpv) = Cpv::parse(s) {
            return Ok(Self::from_cpv(cpv));
        }
        Cpn::parse(s)
            .map(Self::from_cpn)
            .map_err(|_| Error::InvalidIdentity(s.to_string()))
    }

    /// The canonical, version-insensitive name used for dependency matching.
    pub fn cpn(&self) -> &Cpn {
        &self.cpn
    }

    /// The full versioned form, if this identity carries one.
    pub fn cpv(&self) -> Option<&Cpv> {
        self.cpv.as_ref()
    }

    /// Whether `self` and `other` name the same dependency target.
    pub fn same_package(&self, other: &PackageIdentity) -> bool {
        self.cpn == other.cpn
    }
}

impl From<Cpv> for PackageIdentity {
    fn from(cpv: Cpv) -> Self {
        Self::from_cpv(cpv)
    }
}

impl From<Cpn> for PackageIdentity {
    fn from(cpn: Cpn) -> Self {
        Self::from_cpn(cpn)
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

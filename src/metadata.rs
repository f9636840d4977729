//! Package metadata as seen by the reverse-dependency scan.
//!
//! The scan only needs one thing from a package database: the raw string
//! stored in each dependency variable (`DEPEND`, `RDEPEND`, ...). That is
//! what [`MetadataAccessor`] provides. [`PackageRecord`] is the plain data
//! form of the same information, used by
//! [`InMemoryRepository`](crate::InMemoryRepository).

use std::collections::HashMap;
use std::fmt;

use crate::identity::PackageIdentity;

/// PMS dependency class.
///
/// Each variant corresponds to one ebuild variable:
/// - `Depend` — `DEPEND`: build-time dependencies
/// - `Rdepend` — `RDEPEND`: runtime dependencies
/// - `Bdepend` — `BDEPEND`: build host dependencies (cross-compilation)
/// - `Pdepend` — `PDEPEND`: post-merge dependencies
/// - `Idepend` — `IDEPEND`: install-time dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepClass {
    /// `DEPEND` — build-time.
    Depend,
    /// `RDEPEND` — runtime.
    Rdepend,
    /// `BDEPEND` — build host (cross-compilation).
    Bdepend,
    /// `PDEPEND` — post-merge.
    Pdepend,
    /// `IDEPEND` — install-time.
    Idepend,
}

impl DepClass {
    /// Every class, in declaration order.
    pub const ALL: [DepClass; 5] = [
        DepClass::Depend,
        DepClass::Rdepend,
        DepClass::Bdepend,
        DepClass::Pdepend,
        DepClass::Idepend,
    ];

    /// The classes scanned when no explicit selection is made.
    pub const DEFAULT: [DepClass; 4] = [
        DepClass::Depend,
        DepClass::Rdepend,
        DepClass::Bdepend,
        DepClass::Pdepend,
    ];

    /// The ebuild variable name (`"DEPEND"`, `"RDEPEND"`, ...).
    pub fn variable(self) -> &'static str {
        match self {
            DepClass::Depend => "DEPEND",
            DepClass::Rdepend => "RDEPEND",
            DepClass::Bdepend => "BDEPEND",
            DepClass::Pdepend => "PDEPEND",
            DepClass::Idepend => "IDEPEND",
        }
    }

    /// Look up a class by its ebuild variable name.
    pub fn from_variable(name: &str) -> Option<DepClass> {
        DepClass::ALL.into_iter().find(|c| c.variable() == name)
    }
}

impl fmt::Display for DepClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable())
    }
}

/// Source of raw dependency strings.
///
/// Returning `None` means the package has no known metadata, or the
/// variable is not set; the scan treats both as an empty dependency list.
pub trait MetadataAccessor {
    /// Return the raw value of the dependency variable `class` for `package`.
    fn dependency_string(&self, package: &PackageIdentity, class: DepClass) -> Option<String>;
}

impl<F> MetadataAccessor for F
where
    F: Fn(&PackageIdentity, DepClass) -> Option<String>,
{
    fn dependency_string(&self, package: &PackageIdentity, class: DepClass) -> Option<String> {
        self(package, class)
    }
}

/// A package together with its raw dependency variables.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    /// The package this record describes.
    pub identity: PackageIdentity,
    /// Raw dependency strings, keyed by class. Missing keys are unset.
    pub variables: HashMap<DepClass, String>,
}

impl PackageRecord {
    /// A record with no dependency variables set.
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            variables: HashMap::new(),
        }
    }

    /// Set `class` to `raw`, replacing any previous value.
    pub fn with(mut self, class: DepClass, raw: impl Into<String>) -> Self {
        self.variables.insert(class, raw.into());
        self
    }

    /// The raw string stored for `class`, if any.
    pub fn get(&self, class: DepClass) -> Option<&str> {
        self.variables.get(&class).map(String::as_str)
    }
}

//! USE-conditional evaluation.
//!
//! # Scoping rule
//!
//! An atom is active when the USE conditional **directly** enclosing it is
//! satisfied. Conditionals further up the tree are not consulted:
//!
//! ```text
//! foo? ( bar? ( app-misc/x ) )
//! ```
//!
//! `app-misc/x` is active iff `bar` is enabled, whether or not `foo` is.
//! This matches how `equery depends` has always answered reverse-dependency
//! queries; an ancestor-aware (conjunctive) evaluation would report
//! different results and must not be substituted here.
//!
//! Atoms outside any conditional are always active. `||`, `^^`, `??` and
//! bare `( )` groups are transparent and do not change the enclosing guard.

use std::collections::HashSet;

use crate::expr::{AtomRef, DependencyExpression, UseGuard};
use crate::identity::PackageIdentity;

/// The set of enabled USE flags used to evaluate conditionals.
///
/// Any flag not listed is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFlags {
    enabled: HashSet<String>,
}

impl ActiveFlags {
    /// An empty set: every flag is disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `flag`.
    pub fn insert(&mut self, flag: impl Into<String>) {
        self.enabled.insert(flag.into());
    }

    /// Whether `flag` is enabled.
    pub fn contains(&self, flag: &str) -> bool {
        self.enabled.contains(flag)
    }

    /// Whether no flag is enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Decide whether an atom guarded by `guard` is active.
    ///
    /// `guard` must be the innermost conditional enclosing the atom (as
    /// reported by [`DependencyExpression::atoms`]); `None` means the atom
    /// is unconditional.
    pub fn is_active(&self, guard: Option<UseGuard<'_>>) -> bool {
        match guard {
            None => true,
            Some(UseGuard { flag, negate }) => self.contains(flag) != negate,
        }
    }
}

impl From<HashSet<String>> for ActiveFlags {
    fn from(enabled: HashSet<String>) -> Self {
        Self { enabled }
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            enabled: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Source of the USE flags to evaluate a package's dependencies with.
///
/// Consulted once per package per query, and only when USE evaluation is
/// requested. Implementations must not rely on being called for every
/// package.
pub trait FlagSource {
    /// The flags enabled for `package`.
    fn active_flags(&self, package: &PackageIdentity) -> ActiveFlags;
}

/// The same flags for every package.
impl FlagSource for ActiveFlags {
    fn active_flags(&self, _package: &PackageIdentity) -> ActiveFlags {
        self.clone()
    }
}

impl<F> FlagSource for F
where
    F: Fn(&PackageIdentity) -> ActiveFlags,
{
    fn active_flags(&self, package: &PackageIdentity) -> ActiveFlags {
        self(package)
    }
}

/// Iterate over the atoms of `expr` that count as dependencies.
///
/// With `flags = None` USE evaluation is disabled and every atom is
/// returned regardless of conditionals.
pub fn active_atoms<'e>(
    expr: &'e DependencyExpression,
    flags: Option<&ActiveFlags>,
) -> impl Iterator<Item = AtomRef<'e>> {
    expr.atoms()
        .filter(move |atom| flags.is_none_or(|flags| flags.is_active(atom.guard)))
}

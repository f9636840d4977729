//! Atom resolution.
//!
//! Maps an atom to the canonical package name it refers to. Version
//! operators, slots, USE dependencies and repository restrictions are
//! validated by [`portage_atom::Dep`] and then dropped: reverse-dependency
//! matching only looks at `category/name`.

use portage_atom::{Cpn, Dep};

use crate::error::AtomError;

/// The package an atom refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAtom {
    /// Canonical category/package name.
    pub cpn: Cpn,
    /// Whether the atom is a blocker (`!atom` or `!!atom`).
    pub blocker: bool,
}

impl From<&Dep> for ResolvedAtom {
    fn from(dep: &Dep) -> Self {
        Self {
            cpn: dep.cpn,
            blocker: dep.blocker.is_some(),
        }
    }
}

/// Resolve a single atom token to its canonical package name.
///
/// ```ignore
/// let atom = resolve_atom(">=dev-libs/openssl-3.0:0/3[-bindist]")?;
/// assert_eq!(atom.cpn, Cpn::new("dev-libs", "openssl"));
/// ```
pub fn resolve_atom(token: &str) -> Result<ResolvedAtom, AtomError> {
    let dep = Dep::parse(token).map_err(|source| AtomError {
        token: token.to_string(),
        source,
    })?;
    Ok(ResolvedAtom::from(&dep))
}

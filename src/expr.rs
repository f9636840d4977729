//! Dependency expressions.
//!
//! A `*DEPEND` value is parsed with [`DepEntry::parse`] into a tree:
//!
//! ```text
//! dev-libs/a ssl? ( dev-libs/openssl ) || ( app-misc/b app-misc/c ) !app-misc/d
//! ```
//!
//! [`DependencyExpression::atoms`] walks that tree and pairs every atom with
//! the USE conditional closest to it.

use std::fmt;

use portage_atom::{Dep, DepEntry};

/// A parsed dependency string: the root sequence of entries.
///
/// Bare `( ... )` groups are flattened into their parent by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyExpression {
    entries: Vec<DepEntry>,
}

/// The USE conditional directly enclosing an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseGuard<'a> {
    pub flag: &'a str,
    pub negate: bool,
}

/// An atom together with its nearest enclosing USE conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomRef<'a> {
    pub dep: &'a Dep,
    pub guard: Option<UseGuard<'a>>,
}

impl DependencyExpression {
    /// Parse a raw dependency string.
    ///
    /// Empty or whitespace-only input yields an empty expression. Unbalanced
    /// groups, a conditional or `||` without a group and malformed atoms
    /// are all rejected.
    pub fn parse(raw: &str) -> portage_atom::Result<Self> {
        DepEntry::parse(raw).map(|entries| Self { entries })
    }

    /// The top-level entries.
    pub fn entries(&self) -> &[DepEntry] {
        &self.entries
    }

    /// Whether the expression declares nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every atom in document order, paired with the USE
    /// conditional that most closely encloses it.
    ///
    /// `||`, `^^` and `??` groups do not count as conditionals: an atom
    /// inside `foo? ( || ( a b ) )` is guarded by `foo`.
    pub fn atoms(&self) -> Atoms<'_> {
        Atoms {
            stack: vec![(self.entries.iter(), None)],
        }
    }
}

impl From<Vec<DepEntry>> for DependencyExpression {
    fn from(entries: Vec<DepEntry>) -> Self {
        Self { entries }
    }
}

impl std::str::FromStr for DependencyExpression {
    type Err = portage_atom::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DependencyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Iterator returned by [`DependencyExpression::atoms`].
pub struct Atoms<'a> {
    stack: Vec<(std::slice::Iter<'a, DepEntry>, Option<UseGuard<'a>>)>,
}

impl<'a> Iterator for Atoms<'a> {
    type Item = AtomRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (iter, guard) = self.stack.last_mut()?;
            let guard = *guard;
            let Some(entry) = iter.next() else {
                self.stack.pop();
                continue;
            };
            match entry {
                DepEntry::Atom(dep) => return Some(AtomRef { dep, guard }),
                DepEntry::UseConditional {
                    flag,
                    negate,
                    children,
                } => self.stack.push((
                    children.iter(),
                    Some(UseGuard {
                        flag,
                        negate: *negate,
                    }),
                )),
                DepEntry::AnyOf(children)
                | DepEntry::ExactlyOneOf(children)
                | DepEntry::AtMostOneOf(children) => self.stack.push((children.iter(), guard)),
            }
        }
    }
}

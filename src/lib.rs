//! Reverse dependency queries over Portage-style dependency strings.
//!
//! Given a package universe and a way to read each package's `*DEPEND`
//! variables, this crate answers "which packages depend on `cat/pkg`?",
//! either directly or transitively, optionally honouring USE conditionals.
//!
//! The pieces, leaves first:
//!
//! - [`DependencyExpression`] parses a dependency string into
//!   [`DepEntry`] trees and walks their atoms.
//! - [`ActiveFlags`] decides which atoms are active; see [`use_eval`] for
//!   the scoping rule.
//! - [`ResolvedAtom`] reduces an atom to its canonical `category/name`.
//! - [`MetadataAccessor`], [`FlagSource`] and [`PackageRepository`] are the
//!   seams to the package database.
//! - [`ReverseDepGraph`] scans the universe and runs the traversal;
//!   [`reverse_depends`] wraps build and query in one call.
//!
//! ```ignore
//! let repo: InMemoryRepository = records.into_iter().collect();
//! let options = ReverseDepsOptions::default().with_only_direct(false);
//! let target = PackageIdentity::parse("dev-libs/openssl")?;
//! let dependents = reverse_depends(
//!     &target,
//!     &repo.all_packages(),
//!     &repo,
//!     &ActiveFlags::new(),
//!     &options,
//! )?;
//! ```

mod atom;
mod error;
mod expr;
mod graph;
mod identity;
mod metadata;
mod repository;
pub mod use_eval;

pub use atom::{ResolvedAtom, resolve_atom};
pub use error::{AtomError, Error, Result};
pub use expr::{AtomRef, Atoms, DependencyExpression, UseGuard};
#[cfg(feature = "parallel")]
pub use graph::reverse_depends_parallel;
pub use graph::{
    DepEdge, ErrorPolicy, ReverseDepGraph, ReverseDependency, ReverseDepsOptions, reverse_depends,
};
pub use identity::PackageIdentity;
pub use metadata::{DepClass, MetadataAccessor, PackageRecord};
pub use portage_atom::{Cpn, Cpv, Dep, DepEntry};
pub use repository::{InMemoryRepository, PackageRepository};
pub use use_eval::{ActiveFlags, FlagSource, active_atoms};

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::metadata::{DepClass, PackageRecord};
    use crate::repository::{InMemoryRepository, PackageRepository};
    use crate::use_eval::ActiveFlags;
    use crate::{PackageIdentity, ReverseDepsOptions, reverse_depends};

    /// Helper: build a repository from `(cpv, DEPEND)` pairs. `None` models
    /// a package with no metadata at all.
    fn universe(entries: &[(&str, Option<&str>)]) -> InMemoryRepository {
        entries
            .iter()
            .map(|(cpv, depend)| {
                let record = PackageRecord::new(PackageIdentity::parse(cpv).unwrap());
                match depend {
                    Some(raw) => record.with(DepClass::Depend, *raw),
                    None => record,
                }
            })
            .collect()
    }

    fn basic_universe() -> InMemoryRepository {
        universe(&[
            ("app-misc/root-1.0", None),
            ("app-misc/a-1.0", Some("app-misc/root")),
            ("app-misc/b-1.0", Some("app-misc/a")),
            ("app-misc/c-1.0", Some("app-misc/b")),
            ("app-misc/d-1.0", None),
        ])
    }

    fn flags_universe() -> InMemoryRepository {
        universe(&[
            ("app-misc/root-1.0", None),
            ("app-misc/e-1.0", Some("app-misc/root")),
            ("app-misc/f-1.0", Some("foo? ( app-misc/e )")),
            ("app-misc/g-1.0", Some("bar? ( app-misc/f )")),
            ("app-misc/h-1.0", Some("foo? ( bar? ( app-misc/e ) )")),
            ("app-misc/i-1.0", Some("never? ( app-misc/root )")),
        ])
    }

    fn query(
        repo: &InMemoryRepository,
        target: &str,
        flags: &ActiveFlags,
        options: &ReverseDepsOptions,
    ) -> Vec<String> {
        let target = PackageIdentity::parse(target).unwrap();
        reverse_depends(&target, &repo.all_packages(), repo, flags, options)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn evaluated(flags: &[&str]) -> Vec<String> {
        let options = ReverseDepsOptions::default()
            .with_only_direct(false)
            .with_evaluate_use(true);
        let flags: ActiveFlags = flags.iter().copied().collect();
        query(&flags_universe(), "app-misc/root", &flags, &options)
    }

    #[test]
    fn basic_direct() {
        let result = query(
            &basic_universe(),
            "app-misc/root",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default(),
        );
        assert_eq!(result, ["app-misc/a-1.0"]);
    }

    #[test]
    fn basic_transitive() {
        let result = query(
            &basic_universe(),
            "app-misc/root",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default().with_only_direct(false),
        );
        assert_eq!(result, ["app-misc/a-1.0", "app-misc/b-1.0", "app-misc/c-1.0"]);
    }

    #[test]
    fn target_version_is_ignored() {
        let result = query(
            &basic_universe(),
            "app-misc/root-9.9",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default(),
        );
        assert_eq!(result, ["app-misc/a-1.0"]);
    }

    #[test]
    fn no_dependents_is_empty() {
        let result = query(
            &basic_universe(),
            "app-misc/d",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default().with_only_direct(false),
        );
        assert!(result.is_empty());

        let result = query(
            &basic_universe(),
            "app-misc/not-in-universe",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn evaluated_flags_none() {
        assert_eq!(evaluated(&[]), ["app-misc/e-1.0"]);
    }

    #[test]
    fn evaluated_flags_foo() {
        assert_eq!(evaluated(&["foo"]), ["app-misc/e-1.0", "app-misc/f-1.0"]);
    }

    // h only looks at `bar`, the conditional right next to its atom.
    #[test]
    fn evaluated_flags_bar() {
        assert_eq!(evaluated(&["bar"]), ["app-misc/e-1.0", "app-misc/h-1.0"]);
    }

    #[test]
    fn evaluated_flags_foo_bar() {
        assert_eq!(
            evaluated(&["foo", "bar"]),
            ["app-misc/e-1.0", "app-misc/f-1.0", "app-misc/g-1.0", "app-misc/h-1.0"]
        );
    }

    #[test]
    fn unevaluated_flags_see_every_atom() {
        let result = query(
            &flags_universe(),
            "app-misc/root",
            &ActiveFlags::new(),
            &ReverseDepsOptions::default().with_only_direct(false),
        );
        assert_eq!(
            result,
            [
                "app-misc/e-1.0",
                "app-misc/f-1.0",
                "app-misc/g-1.0",
                "app-misc/h-1.0",
                "app-misc/i-1.0"
            ]
        );
    }

    #[test]
    fn repeated_queries_agree() {
        let repo = flags_universe();
        let options = ReverseDepsOptions::default()
            .with_only_direct(false)
            .with_evaluate_use(true);
        let flags: ActiveFlags = ["foo"].into_iter().collect();
        let target = PackageIdentity::parse("app-misc/root").unwrap();
        let universe = repo.all_packages();

        let first: BTreeSet<_> =
            reverse_depends(&target, &universe, &repo, &flags, &options).unwrap();
        let second: BTreeSet<_> =
            reverse_depends(&target, &universe, &repo, &flags, &options).unwrap();
        assert_eq!(first, second);
    }
}

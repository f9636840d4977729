//! Reverse-dependency graph.
//!
//! [`ReverseDepGraph`] scans a package universe once, turning every
//! package's dependency variables into edges `dependent -> category/name`,
//! and then answers direct and transitive reverse-dependency queries
//! against that edge set.
//!
//! The scan is an independent map over packages (fetch, parse, evaluate,
//! resolve); with the `parallel` feature it can run on rayon through
//! [`ReverseDepGraph::build_parallel`]. Edges are kept in universe order
//! either way, so both builds produce identical graphs.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use portage_atom::Cpn;
use tracing::{debug, trace, warn};

use crate::atom::ResolvedAtom;
use crate::error::{Error, Result};
use crate::expr::DependencyExpression;
use crate::identity::PackageIdentity;
use crate::metadata::{DepClass, MetadataAccessor};
use crate::repository::PackageRepository;
use crate::use_eval::{FlagSource, active_atoms};

/// What to do with a package whose dependency data cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Fail the whole query with the first error, in universe order.
    #[default]
    Abort,
    /// Drop the offending dependency variable of that package, log it and
    /// keep going. Collected errors are available from
    /// [`ReverseDepGraph::errors`].
    Skip,
}

/// Options for building a graph and querying it.
///
/// `evaluate_use`, `classes` and `error_policy` affect the scan;
/// `only_direct` and `max_depth` affect the traversal.
#[derive(Debug, Clone)]
pub struct ReverseDepsOptions {
    /// Return only packages that depend on the target themselves.
    pub only_direct: bool,
    /// Honour USE conditionals. When unset, every atom counts.
    pub evaluate_use: bool,
    /// Maximum traversal depth for transitive queries (`None` = unbounded).
    /// Depth 1 is the direct dependents; 0 is treated as 1.
    pub max_depth: Option<usize>,
    /// Dependency variables to scan.
    pub classes: Vec<DepClass>,
    /// Handling of malformed dependency data.
    pub error_policy: ErrorPolicy,
}

impl Default for ReverseDepsOptions {
    fn default() -> Self {
        Self {
            only_direct: true,
            evaluate_use: false,
            max_depth: None,
            classes: DepClass::DEFAULT.to_vec(),
            error_policy: ErrorPolicy::Abort,
        }
    }
}

impl ReverseDepsOptions {
    /// Set [`only_direct`](Self::only_direct).
    pub fn with_only_direct(mut self, only_direct: bool) -> Self {
        self.only_direct = only_direct;
        self
    }

    /// Set [`evaluate_use`](Self::evaluate_use).
    pub fn with_evaluate_use(mut self, evaluate_use: bool) -> Self {
        self.evaluate_use = evaluate_use;
        self
    }

    /// Bound transitive queries to `max_depth` levels.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Scan only the given dependency variables.
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = DepClass>) -> Self {
        self.classes = classes.into_iter().collect();
        self
    }

    /// Set [`error_policy`](Self::error_policy).
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// The depth limit the traversal runs with.
    fn depth_limit(&self) -> Option<usize> {
        if self.only_direct {
            Some(1)
        } else {
            self.max_depth
        }
    }
}

/// A declared dependency of one package on a category/package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEdge {
    /// The depending package.
    pub dependent: PackageIdentity,
    /// The package depended upon.
    pub dependency: Cpn,
    /// The variable the atom was found in.
    pub class: DepClass,
    /// The atom, in normalized form.
    pub atom: String,
}

/// One package in a reverse-dependency result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseDependency {
    /// The dependent package, in its full versioned form.
    pub package: PackageIdentity,
    /// Distance from the target; 1 for direct dependents.
    pub depth: usize,
    /// The name `package` was found to depend on: the target itself for
    /// direct dependents, otherwise a package one level closer to it.
    pub via: Cpn,
    /// The variable the matching atom came from.
    pub class: DepClass,
    /// The matching atom, in normalized form.
    pub atom: String,
}

/// Outcome of scanning one package.
#[derive(Default)]
struct PackageScan {
    edges: Vec<DepEdge>,
    errors: Vec<Error>,
}

/// Reverse index of dependency edges over a package universe.
#[derive(Debug, Clone, Default)]
pub struct ReverseDepGraph {
    edges: Vec<DepEdge>,
    dependents: HashMap<Cpn, Vec<usize>>,
    errors: Vec<Error>,
}

impl ReverseDepGraph {
    /// Scan `universe` and build the graph.
    pub fn build(
        universe: &[PackageIdentity],
        accessor: &dyn MetadataAccessor,
        flags: &dyn FlagSource,
        options: &ReverseDepsOptions,
    ) -> Result<Self> {
        let scans = universe
            .iter()
            .map(|package| scan_package(package, accessor, flags, options))
            .collect();
        Self::from_scans(universe.len(), scans, options)
    }

    /// Like [`build`](Self::build), but scans packages on the rayon thread
    /// pool.
    #[cfg(feature = "parallel")]
    pub fn build_parallel(
        universe: &[PackageIdentity],
        accessor: &(dyn MetadataAccessor + Sync),
        flags: &(dyn FlagSource + Sync),
        options: &ReverseDepsOptions,
    ) -> Result<Self> {
        use rayon::prelude::*;

        let scans = universe
            .par_iter()
            .map(|package| scan_package(package, accessor, flags, options))
            .collect();
        Self::from_scans(universe.len(), scans, options)
    }

    /// Build from a repository that both lists the universe and serves its
    /// metadata.
    pub fn from_repository<R>(
        repo: &R,
        flags: &dyn FlagSource,
        options: &ReverseDepsOptions,
    ) -> Result<Self>
    where
        R: PackageRepository + MetadataAccessor,
    {
        Self::build(&repo.all_packages(), repo, flags, options)
    }

    fn from_scans(
        packages: usize,
        scans: Vec<PackageScan>,
        options: &ReverseDepsOptions,
    ) -> Result<Self> {
        let mut graph = Self::default();
        for scan in scans {
            for err in scan.errors {
                match options.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        warn!(error = %err, "skipping malformed dependency data");
                        graph.errors.push(err);
                    }
                }
            }
            for edge in scan.edges {
                graph
                    .dependents
                    .entry(edge.dependency)
                    .or_default()
                    .push(graph.edges.len());
                graph.edges.push(edge);
            }
        }
        debug!(
            packages,
            edges = graph.edges.len(),
            skipped = graph.errors.len(),
            evaluate_use = options.evaluate_use,
            "built reverse dependency graph"
        );
        Ok(graph)
    }

    /// Every edge, in universe order.
    pub fn edges(&self) -> &[DepEdge] {
        &self.edges
    }

    /// Errors skipped under [`ErrorPolicy::Skip`].
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Edges pointing at `dependency`.
    pub fn edges_to<'g>(&'g self, dependency: &Cpn) -> impl Iterator<Item = &'g DepEdge> + use<'g> {
        self.dependents
            .get(dependency)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.edges[i])
    }

    /// The names `package` depends on, in declaration order, without
    /// duplicates.
    pub fn dependencies_of(&self, package: &PackageIdentity) -> Vec<Cpn> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|edge| &edge.dependent == package)
            .filter(|edge| seen.insert(edge.dependency))
            .map(|edge| edge.dependency)
            .collect()
    }

    /// Packages that depend on `target` directly.
    pub fn direct(&self, target: &Cpn) -> Vec<ReverseDependency> {
        self.traverse(target, Some(1))
    }

    /// Packages that depend on `target` directly or through other packages,
    /// up to `max_depth` levels (`None` = unbounded, `Some(0)` is the same
    /// as [`direct`](Self::direct)).
    pub fn transitive(&self, target: &Cpn, max_depth: Option<usize>) -> Vec<ReverseDependency> {
        self.traverse(target, max_depth)
    }

    /// Run the query described by `options` (`only_direct`, `max_depth`).
    pub fn query(&self, target: &Cpn, options: &ReverseDepsOptions) -> Vec<ReverseDependency> {
        self.traverse(target, options.depth_limit())
    }

    /// Breadth-first walk over reverse edges starting at `target`.
    ///
    /// Names are expanded at most once, so cyclic metadata terminates.
    /// A limit of 0 still reports the direct dependents.
    /// Packages named like the target are never reported. Each package is
    /// reported once, at the smallest depth it was reached.
    fn traverse(&self, target: &Cpn, max_depth: Option<usize>) -> Vec<ReverseDependency> {
        let max_depth = max_depth.map(|max| max.max(1));
        let mut expanded: HashSet<Cpn> = HashSet::from([*target]);
        let mut reported: HashSet<PackageIdentity> = HashSet::new();
        let mut queue = VecDeque::from([(*target, 0usize)]);
        let mut found = Vec::new();

        while let Some((cpn, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for edge in self.edges_to(&cpn) {
                let dependent = edge.dependent.cpn();
                if dependent == target {
                    continue;
                }
                if reported.insert(edge.dependent.clone()) {
                    trace!(package = %edge.dependent, via = %cpn, depth = depth + 1, "reverse dependency");
                    found.push(ReverseDependency {
                        package: edge.dependent.clone(),
                        depth: depth + 1,
                        via: cpn,
                        class: edge.class,
                        atom: edge.atom.clone(),
                    });
                }
                if expanded.insert(*dependent) {
                    queue.push_back((*dependent, depth + 1));
                }
            }
        }

        found.sort_by(|a, b| a.package.cmp(&b.package));
        debug!(cpn = %target, results = found.len(), ?max_depth, "reverse dependency query");
        found
    }
}

/// Fetch, parse, evaluate and resolve the dependency variables of one
/// package.
///
/// A failure in one variable drops that variable's edges only.
fn scan_package(
    package: &PackageIdentity,
    accessor: &dyn MetadataAccessor,
    flags: &dyn FlagSource,
    options: &ReverseDepsOptions,
) -> PackageScan {
    let mut scan = PackageScan::default();
    let active = options.evaluate_use.then(|| flags.active_flags(package));
    let mut seen: HashSet<(Cpn, DepClass)> = HashSet::new();

    for &class in &options.classes {
        let Some(raw) = accessor.dependency_string(package, class) else {
            continue;
        };
        let expr = match DependencyExpression::parse(&raw) {
            Ok(expr) => expr,
            Err(source) => {
                scan.errors.push(Error::Parse {
                    package: package.clone(),
                    class,
                    raw,
                    source,
                });
                continue;
            }
        };

        for atom in active_atoms(&expr, active.as_ref()) {
            let resolved = ResolvedAtom::from(atom.dep);
            if resolved.blocker || !seen.insert((resolved.cpn, class)) {
                continue;
            }
            scan.edges.push(DepEdge {
                dependent: package.clone(),
                dependency: resolved.cpn,
                class,
                atom: atom.dep.to_string(),
            });
        }
    }

    scan
}

/// Find the packages in `universe` that depend on `target`.
///
/// With `options.only_direct` only immediate dependents are returned;
/// otherwise the full set of dependents-of-dependents (bounded by
/// `options.max_depth`). `target`'s version, if any, is ignored. `flags` is
/// only consulted when `options.evaluate_use` is set.
pub fn reverse_depends(
    target: &PackageIdentity,
    universe: &[PackageIdentity],
    accessor: &dyn MetadataAccessor,
    flags: &dyn FlagSource,
    options: &ReverseDepsOptions,
) -> Result<BTreeSet<PackageIdentity>> {
    let graph = ReverseDepGraph::build(universe, accessor, flags, options)?;
    Ok(graph
        .query(target.cpn(), options)
        .into_iter()
        .map(|dep| dep.package)
        .collect())
}

/// [`reverse_depends`] with the universe scan run on rayon.
#[cfg(feature = "parallel")]
pub fn reverse_depends_parallel(
    target: &PackageIdentity,
    universe: &[PackageIdentity],
    accessor: &(dyn MetadataAccessor + Sync),
    flags: &(dyn FlagSource + Sync),
    options: &ReverseDepsOptions,
) -> Result<BTreeSet<PackageIdentity>> {
    let graph = ReverseDepGraph::build_parallel(universe, accessor, flags, options)?;
    Ok(graph
        .query(target.cpn(), options)
        .into_iter()
        .map(|dep| dep.package)
        .collect())
}

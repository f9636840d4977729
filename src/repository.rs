//! Package repository abstraction.
//!
//! [`PackageRepository`] enumerates the package universe.
//! [`InMemoryRepository`] is a simple implementation for testing that also
//! serves as a [`MetadataAccessor`].

use std::collections::HashMap;

use crate::identity::PackageIdentity;
use crate::metadata::{DepClass, MetadataAccessor, PackageRecord};

/// Read-only listing of a package universe.
pub trait PackageRepository {
    /// Return every package (usually every version) in the repository.
    fn all_packages(&self) -> Vec<PackageIdentity>;

    /// Return the packages accepted by `predicate`, in listing order.
    fn packages_matching(
        &self,
        predicate: &dyn Fn(&PackageIdentity) -> bool,
    ) -> Vec<PackageIdentity> {
        self.all_packages()
            .into_iter()
            .filter(|pkg| predicate(pkg))
            .collect()
    }
}

/// In-memory repository backed by a `HashMap`, useful for tests.
///
/// Packages are listed in insertion order. A package may be added without
/// any dependency variables, which models a package with no known
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    order: Vec<PackageIdentity>,
    records: HashMap<PackageIdentity, PackageRecord>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package record, replacing any previous record for the same
    /// identity.
    pub fn add(&mut self, record: PackageRecord) {
        if !self.records.contains_key(&record.identity) {
            self.order.push(record.identity.clone());
        }
        self.records.insert(record.identity.clone(), record);
    }

    /// Look up the record for `package`.
    pub fn get(&self, package: &PackageIdentity) -> Option<&PackageRecord> {
        self.records.get(package)
    }

    /// Number of packages in the repository.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the repository holds no packages.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<PackageRecord> for InMemoryRepository {
    fn from_iter<I: IntoIterator<Item = PackageRecord>>(iter: I) -> Self {
        let mut repo = Self::new();
        for record in iter {
            repo.add(record);
        }
        repo
    }
}

impl PackageRepository for InMemoryRepository {
    fn all_packages(&self) -> Vec<PackageIdentity> {
        self.order.clone()
    }
}

impl MetadataAccessor for InMemoryRepository {
    fn dependency_string(&self, package: &PackageIdentity, class: DepClass) -> Option<String> {
        self.records
            .get(package)
            .and_then(|record| record.get(class))
            .map(str::to_string)
    }
}

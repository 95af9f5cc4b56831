// SPDX-License-Identifier: MPL-2.0

//! Provide index and baseline set, built together in one pass
//! over the metadata database.
//!
//! Only the first listed version of a package is inspected:
//! it stands for the whole package when deciding whether the package
//! is part of the baseline and which names it provides.

use crate::error::ClosureError;
use crate::metadata::MetadataProvider;
use crate::package::Package;
use crate::type_aliases::{FxIndexMap, FxIndexSet};
use crate::version::Version;

/// Map from a provided name to the concrete packages providing it.
///
/// Providers are kept in the order the database lists packages.
/// That order is the tie-break used when resolving a virtual name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvideIndex<P: Package> {
    entries: FxIndexMap<P, FxIndexSet<P>>,
}

impl<P: Package> Default for ProvideIndex<P> {
    fn default() -> Self {
        Self {
            entries: FxIndexMap::default(),
        }
    }
}

impl<P: Package> ProvideIndex<P> {
    /// Record that `owner` provides `name`.
    /// Self provides are not recorded.
    pub fn insert(&mut self, name: P, owner: P) {
        if name != owner {
            self.entries.entry(name).or_default().insert(owner);
        }
    }

    /// Providers of `name`, in tie-break order.
    pub fn providers(&self, name: &P) -> Option<&FxIndexSet<P>> {
        self.entries.get(name)
    }

    /// Iterate over provided names and their providers.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &FxIndexSet<P>)> {
        self.entries.iter()
    }

    /// Number of provided names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no package provides anything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The provide index and the baseline of a database.
#[derive(Debug, Clone)]
pub struct MetadataCache<P: Package, V: Version> {
    /// Provided name to providers.
    pub provides: ProvideIndex<P>,
    /// Packages whose first version has required or important priority,
    /// with that version.
    pub baseline: FxIndexMap<P, V>,
}

impl<P: Package, V: Version> MetadataCache<P, V> {
    /// Scan every package of the database once.
    /// Virtual packages own no version, hence no provide, and are skipped.
    pub fn build(provider: &impl MetadataProvider<P, V>) -> Result<Self, ClosureError<P, V>> {
        log::info!("Building cache...");
        let mut provides = ProvideIndex::default();
        let mut baseline = FxIndexMap::default();

        let packages = provider
            .list_packages()
            .map_err(|source| ClosureError::ErrorRetrievingPackages { source })?;

        for package in packages {
            let versions = provider
                .list_available_versions(&package)
                .map_err(|source| ClosureError::ErrorRetrievingVersions {
                    package: package.clone(),
                    source,
                })?;
            let Some(version) = versions.and_then(|v| v.into_iter().next()) else {
                continue;
            };

            let priority = provider.get_priority(&package, &version).map_err(|source| {
                ClosureError::ErrorRetrievingPriority {
                    package: package.clone(),
                    version: version.clone(),
                    source,
                }
            })?;
            let provided = provider.get_provides(&package, &version).map_err(|source| {
                ClosureError::ErrorRetrievingProvides {
                    package: package.clone(),
                    version: version.clone(),
                    source,
                }
            })?;

            for name in provided {
                provides.insert(name, package.clone());
            }
            if priority.is_baseline() {
                baseline.insert(package, version);
            }
        }

        log::debug!(
            "{} provided names, {} baseline packages",
            provides.len(),
            baseline.len()
        );
        Ok(Self { provides, baseline })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{OfflineMetadataProvider, PackageVersion, Priority};

    #[test]
    fn first_version_decides() {
        let mut db = OfflineMetadataProvider::<&str, u32>::new();
        db.add_version(
            "libc6",
            PackageVersion::new(2u32)
                .priority(Priority::Required)
                .provides(["libc6", "libc-abi"]),
        );
        db.add_version(
            "libc6",
            PackageVersion::new(1u32)
                .priority(Priority::Optional)
                .provides(["old-abi"]),
        );
        db.add_version(
            "musl",
            PackageVersion::new(1u32)
                .priority(Priority::Extra)
                .provides(["libc-abi"]),
        );

        let cache = MetadataCache::build(&db).unwrap();
        assert_eq!(cache.baseline.get("libc6"), Some(&2));
        assert!(!cache.baseline.contains_key("musl"));

        let providers: Vec<_> = cache.provides.providers(&"libc-abi").unwrap().iter().copied().collect();
        assert_eq!(providers, ["libc6", "musl"]);
        assert!(cache.provides.providers(&"libc6").is_none());
        assert!(cache.provides.providers(&"old-abi").is_none());
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Access to the package metadata database.
//!
//! The resolver never reads package indexes itself.
//! Everything it knows about packages comes through the
//! [MetadataProvider] trait: the list of packages, the versions
//! of each package, and for each version its dependency records,
//! its provides and its priority.
//!
//! [OfflineMetadataProvider] is a basic in-memory implementation,
//! enough for tests, benchmarks and snapshots serialized with `serde`.

use std::error::Error;

use crate::constraint::Constraint;
use crate::package::Package;
use crate::type_aliases::FxIndexMap;
use crate::version::Version;

/// Relation kind of a dependency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DependencyKind {
    /// `Depends:`
    #[default]
    Depends,
    /// `Pre-Depends:`
    PreDepends,
    /// `Recommends:`
    Recommends,
    /// `Suggests:`
    Suggests,
    /// `Enhances:`
    Enhances,
    /// `Conflicts:`
    Conflicts,
    /// `Breaks:`
    Breaks,
    /// `Replaces:`
    Replaces,
    /// `Obsoletes:`
    Obsoletes,
}

impl DependencyKind {
    /// Only these relations pull packages into the closure.
    pub fn is_resolvable(self) -> bool {
        matches!(self, Self::Depends | Self::PreDepends | Self::Recommends)
    }
}

/// Priority classification of a package version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    /// Needed for the proper functioning of the system.
    Required,
    /// Expected on any Unix-like system.
    Important,
    /// Reasonably small but not too specialized.
    Standard,
    /// Everything else.
    #[default]
    Optional,
    /// Deprecated alias of optional.
    Extra,
}

impl Priority {
    /// Versions with this priority belong to the baseline (bootstrap) set.
    pub fn is_baseline(self) -> bool {
        matches!(self, Self::Required | Self::Important)
    }
}

/// One dependency record of a package version.
///
/// Consecutive records joined by [or_next](Dependency::or_next)
/// form an OR-group, terminated by the first record that is not.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dependency<P, V> {
    /// Target package name, concrete or virtual.
    pub package: P,
    /// Version constraint on the target.
    #[cfg_attr(feature = "serde", serde(default = "Constraint::default"))]
    pub constraint: Constraint<V>,
    /// Relation kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: DependencyKind,
    /// This record is OR-joined to the next one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub or_next: bool,
}

impl<P, V> Dependency<P, V> {
    /// Record of the given kind on `package`, any version.
    pub fn new(package: impl Into<P>, kind: DependencyKind) -> Self {
        Self {
            package: package.into(),
            constraint: Constraint::Any,
            kind,
            or_next: false,
        }
    }

    /// `Depends: package`
    pub fn depends(package: impl Into<P>) -> Self {
        Self::new(package, DependencyKind::Depends)
    }

    /// `Pre-Depends: package`
    pub fn pre_depends(package: impl Into<P>) -> Self {
        Self::new(package, DependencyKind::PreDepends)
    }

    /// `Recommends: package`
    pub fn recommends(package: impl Into<P>) -> Self {
        Self::new(package, DependencyKind::Recommends)
    }

    /// Restrict the accepted versions.
    pub fn with_constraint(mut self, constraint: Constraint<V>) -> Self {
        self.constraint = constraint;
        self
    }

    /// Join this record to the next one with a logical OR.
    pub fn or(mut self) -> Self {
        self.or_next = true;
        self
    }
}

/// Trait that allows the resolver to read the package metadata database.
/// An implementor needs to be supplied to the [resolve](crate::solver::resolve) function.
///
/// The database is read-only for the whole run.
/// All methods returning a `Result` may fail for reasons of their own
/// (I/O, corrupt index...); such failures abort the run.
pub trait MetadataProvider<P: Package, V: Version> {
    /// Lists every package known to the database, concrete and virtual.
    /// The order is the tie-break order of the provide index.
    fn list_packages(&self) -> Result<Vec<P>, Box<dyn Error>>;

    /// Lists available versions of a package, best first.
    /// Returns `None` if the package does not exist at all,
    /// and an empty list if it is virtual.
    fn list_available_versions(&self, package: &P) -> Result<Option<Vec<V>>, Box<dyn Error>>;

    /// Dependency records of a package version, in declaration order.
    fn get_dependencies(
        &self,
        package: &P,
        version: &V,
    ) -> Result<Vec<Dependency<P, V>>, Box<dyn Error>>;

    /// Names provided by a package version, in declaration order.
    fn get_provides(&self, package: &P, version: &V) -> Result<Vec<P>, Box<dyn Error>>;

    /// Priority classification of a package version.
    fn get_priority(&self, package: &P, version: &V) -> Result<Priority, Box<dyn Error>>;

    /// Whether `version` of `package` satisfies `constraint`.
    /// Databases with their own version ordering override this.
    fn satisfies(&self, package: &P, version: &V, constraint: &Constraint<V>) -> bool {
        let _ = package;
        constraint.contains(version)
    }
}

/// Everything the database knows about one version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackageVersion<P, V> {
    /// Version identifier.
    pub version: V,
    /// Priority classification.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    /// Dependency records in declaration order.
    #[cfg_attr(feature = "serde", serde(default = "Vec::new"))]
    pub dependencies: Vec<Dependency<P, V>>,
    /// Provided names in declaration order.
    #[cfg_attr(feature = "serde", serde(default = "Vec::new"))]
    pub provides: Vec<P>,
}

impl<P, V> PackageVersion<P, V> {
    /// Version with no dependency and no provide, of optional priority.
    pub fn new(version: impl Into<V>) -> Self {
        Self {
            version: version.into(),
            priority: Priority::default(),
            dependencies: Vec::new(),
            provides: Vec::new(),
        }
    }

    /// Set the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Append dependency records.
    pub fn depends<I: IntoIterator<Item = Dependency<P, V>>>(mut self, dependencies: I) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Append provided names.
    pub fn provides<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<P>,
    {
        self.provides.extend(names.into_iter().map(Into::into));
        self
    }
}

/// A basic implementation of [MetadataProvider].
///
/// Packages are kept in insertion order, versions in the order they were added.
/// Like a real package cache, every name mentioned by a dependency record
/// or a provide owns an entry: adding a version registers those names
/// as virtual packages unless they are already known.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "P: serde::Serialize + Package, V: serde::Serialize",
        deserialize = "P: serde::Deserialize<'de> + Package, V: serde::Deserialize<'de>"
    ))
)]
pub struct OfflineMetadataProvider<P: Package, V: Version> {
    packages: FxIndexMap<P, Vec<PackageVersion<P, V>>>,
}

impl<P: Package, V: Version> Default for OfflineMetadataProvider<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Package, V: Version> OfflineMetadataProvider<P, V> {
    /// Creates an empty OfflineMetadataProvider.
    pub fn new() -> Self {
        Self {
            packages: FxIndexMap::default(),
        }
    }

    /// Registers a version of a package, after the ones already registered.
    /// Names it depends on or provides get a virtual entry if unknown.
    pub fn add_version(&mut self, package: impl Into<P>, version: PackageVersion<P, V>) {
        let package = package.into();
        self.packages.entry(package.clone()).or_default();
        for name in version
            .dependencies
            .iter()
            .map(|dep| &dep.package)
            .chain(version.provides.iter())
        {
            if !self.packages.contains_key(name) {
                self.packages.insert(name.clone(), Vec::new());
            }
        }
        if let Some(versions) = self.packages.get_mut(&package) {
            versions.push(version);
        }
    }

    /// Registers a name without any version.
    pub fn add_virtual(&mut self, package: impl Into<P>) {
        self.packages.entry(package.into()).or_default();
    }

    /// Lists packages that have been saved.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.packages.keys()
    }

    /// Number of registered package names, virtual ones included.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn entry(&self, package: &P, version: &V) -> Result<&PackageVersion<P, V>, Box<dyn Error>> {
        self.packages
            .get(package)
            .and_then(|versions| versions.iter().find(|pv| &pv.version == version))
            .ok_or_else(|| format!("no version {} of package {}", version, package).into())
    }
}

impl<P: Package, V: Version> MetadataProvider<P, V> for OfflineMetadataProvider<P, V> {
    fn list_packages(&self) -> Result<Vec<P>, Box<dyn Error>> {
        Ok(self.packages.keys().cloned().collect())
    }

    fn list_available_versions(&self, package: &P) -> Result<Option<Vec<V>>, Box<dyn Error>> {
        Ok(self
            .packages
            .get(package)
            .map(|versions| versions.iter().map(|pv| pv.version.clone()).collect()))
    }

    fn get_dependencies(
        &self,
        package: &P,
        version: &V,
    ) -> Result<Vec<Dependency<P, V>>, Box<dyn Error>> {
        Ok(self.entry(package, version)?.dependencies.clone())
    }

    fn get_provides(&self, package: &P, version: &V) -> Result<Vec<P>, Box<dyn Error>> {
        Ok(self.entry(package, version)?.provides.clone())
    }

    fn get_priority(&self, package: &P, version: &V) -> Result<Priority, Box<dyn Error>> {
        Ok(self.entry(package, version)?.priority)
    }
}

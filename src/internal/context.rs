// SPDX-License-Identifier: MPL-2.0

//! State of one resolution run.
//!
//! Every map the algorithm mutates lives in [Context], owned by the run
//! and passed by exclusive reference to the closure builder and to the
//! multiple-choice resolver.

use crate::error::{ClosureError, LookupError};
use crate::internal::arena::{Arena, Id};
use crate::metadata::{Dependency, MetadataProvider};
use crate::package::Package;
use crate::provides::MetadataCache;
use crate::solver::OrGroup;
use crate::type_aliases::{FxIndexMap, FxIndexSet, Map};
use crate::version::Version;

/// Current state of a resolution run.
pub struct Context<'p, P: Package, V: Version, DP: MetadataProvider<P, V>> {
    pub provider: &'p DP,

    /// Provide index and baseline, read-only after construction.
    pub cache: MetadataCache<P, V>,

    /// The result set. Entries are never removed.
    /// `None` marks a package added without a specific version.
    pub packages: FxIndexMap<P, Option<V>>,

    /// Names that may not be chosen as an OR alternative.
    pub banned: FxIndexSet<P>,

    /// Memoized virtual resolutions, `None` once a name is known unresolvable.
    virtuals: Map<P, Option<P>>,

    /// Storage of every OR-group met so far.
    pub groups: Arena<OrGroup<P, V>>,

    /// OR-groups waiting for the next multiple-choice round.
    pub pending: Vec<Id<OrGroup<P, V>>>,

    /// OR-groups whose alternatives all ended up banned.
    pub unresolved: Vec<Id<OrGroup<P, V>>>,
}

impl<'p, P: Package, V: Version, DP: MetadataProvider<P, V>> Context<'p, P, V, DP> {
    pub fn new(
        provider: &'p DP,
        cache: MetadataCache<P, V>,
        banned: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            provider,
            cache,
            packages: FxIndexMap::default(),
            banned: banned.into_iter().collect(),
            virtuals: Map::default(),
            groups: Arena::default(),
            pending: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Available versions of a package, `None` if the name is unknown.
    pub fn versions(&self, package: &P) -> Result<Option<Vec<V>>, ClosureError<P, V>> {
        self.provider
            .list_available_versions(package)
            .map_err(|source| ClosureError::ErrorRetrievingVersions {
                package: package.clone(),
                source,
            })
    }

    /// First listed version of a package known to be concrete.
    pub fn best_version(&self, package: &P) -> Result<V, ClosureError<P, V>> {
        self.versions(package)?
            .and_then(|versions| versions.into_iter().next())
            .ok_or_else(|| {
                ClosureError::Failure(format!("package {} was expected to have a version", package))
            })
    }

    pub fn dependencies(
        &self,
        package: &P,
        version: &V,
    ) -> Result<Vec<Dependency<P, V>>, ClosureError<P, V>> {
        self.provider
            .get_dependencies(package, version)
            .map_err(|source| ClosureError::ErrorRetrievingDependencies {
                package: package.clone(),
                version: version.clone(),
                source,
            })
    }

    /// Whether a name is already taken care of, by the result set or the baseline.
    pub fn is_present(&self, package: &P) -> bool {
        self.packages.contains_key(package) || self.cache.baseline.contains_key(package)
    }

    /// Add a package to the result set.
    pub fn insert(&mut self, package: P, version: Option<V>, depth: usize) {
        log::debug!("[{:2}]{}->{}", depth, "-".repeat(depth), package);
        self.packages.insert(package, version);
    }

    /// Turn a requested name into a concrete package,
    /// going through the provide index for virtual names.
    pub fn lookup(&mut self, name: &P) -> Result<Result<P, LookupError<P>>, ClosureError<P, V>> {
        Ok(match self.versions(name)? {
            None => Err(LookupError::NotFound(name.clone())),
            Some(versions) if versions.is_empty() => self.resolve_provide(name).map(|provider| {
                log::info!("{} is a virtual package, using {}", name, provider);
                provider
            }),
            Some(_) => Ok(name.clone()),
        })
    }

    /// Pick the concrete package standing for a provided name.
    ///
    /// A provider already in the result set wins, otherwise the first one
    /// in provide index order. Banned names are not filtered here.
    /// The answer is memoized for the whole run, failures included,
    /// so asking twice always gives the same package.
    pub fn resolve_provide(&mut self, name: &P) -> Result<P, LookupError<P>> {
        let choice = match self.virtuals.get(name) {
            Some(cached) => cached.clone(),
            None => {
                let choice = self.cache.provides.providers(name).and_then(|providers| {
                    providers
                        .iter()
                        .find(|p| self.packages.contains_key(*p))
                        .or_else(|| providers.first())
                        .cloned()
                });
                self.virtuals.insert(name.clone(), choice.clone());
                choice
            }
        };
        choice.ok_or_else(|| LookupError::UnresolvedVirtual(name.clone()))
    }
}

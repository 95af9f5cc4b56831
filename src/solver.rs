// SPDX-License-Identifier: MPL-2.0

//! Dependency closure computation.
//!
//! Given target package names, the resolver picks a concrete package
//! for each of them, walks their dependencies and returns every concrete
//! package needed to install them. This is not a solver in the SAT sense:
//! choices are made once, with fixed tie-breaks, and never backtracked.
//!
//! The run goes through four phases:
//!
//!  1. Build the provide index and the baseline
//!     (see [MetadataCache](crate::provides::MetadataCache)).
//!  2. Seed the result set with the targets, resolving virtual ones
//!     through the provide index.
//!     Targets that do not exist or cannot be resolved are reported
//!     as bad targets.
//!  3. Expand every added package depth-first. Single-choice dependencies
//!     are followed immediately, OR-groups are deferred.
//!  4. Decide the deferred OR-groups in rounds until nothing changes,
//!     banning virtual names that cannot be resolved.
//!
//! ## API
//!
//! ```
//! # use apt_closure::metadata::{Dependency, OfflineMetadataProvider, PackageVersion};
//! # use apt_closure::solver::{resolve, Request};
//! let mut db = OfflineMetadataProvider::<&str, u32>::new();
//! db.add_version("menu", PackageVersion::new(1u32).depends([Dependency::depends("icons")]));
//! db.add_version("icons", PackageVersion::new(1u32));
//!
//! let closure = resolve(&db, &Request::new(["menu"])).unwrap();
//! assert_eq!(closure.names().copied().collect::<Vec<_>>(), ["menu", "icons"]);
//! ```
//!
//! Failures to resolve a single name never abort the run:
//! they show up in [Closure::bad_targets] and [Closure::unresolved_groups].
//! Only errors of the [MetadataProvider] itself are returned as `Err`.

use std::fmt::{self, Display};

use crate::error::ClosureError;
use crate::internal::context::Context;
use crate::metadata::{Dependency, MetadataProvider};
use crate::package::Package;
use crate::provides::{MetadataCache, ProvideIndex};
use crate::type_aliases::{FxIndexMap, FxIndexSet};
use crate::version::Version;

/// What to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<P: Package> {
    targets: Vec<P>,
    banned: Vec<P>,
    include_baseline: bool,
    compute_baseline: bool,
}

impl<P: Package> Request<P> {
    /// Closure of the given targets, nothing banned, baseline left out.
    pub fn new<I, N>(targets: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<P>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            banned: Vec::new(),
            include_baseline: false,
            compute_baseline: false,
        }
    }

    /// Never choose these names as an alternative of an OR-group.
    pub fn ban<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<P>,
    {
        self.banned.extend(names.into_iter().map(Into::into));
        self
    }

    /// Append the baseline names to the result.
    pub fn include_baseline(mut self, include: bool) -> Self {
        self.include_baseline = include;
        self
    }

    /// Use the baseline packages as targets, instead of the given ones.
    /// Takes precedence over [include_baseline](Request::include_baseline).
    pub fn compute_baseline(mut self, compute: bool) -> Self {
        self.compute_baseline = compute;
        self
    }

    /// Requested targets.
    pub fn targets(&self) -> &[P] {
        &self.targets
    }

    /// Names banned by the caller.
    pub fn banned(&self) -> &[P] {
        &self.banned
    }
}

/// A dependency OR-group: any one alternative satisfies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrGroup<P, V> {
    /// Package declaring the group.
    pub owner: P,
    /// Version of the owner declaring the group.
    pub version: V,
    /// Alternatives, in declaration order.
    pub alternatives: Vec<Dependency<P, V>>,
}

impl<P: Package, V: Version> Display for OrGroup<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dep) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", dep.package)?;
            if dep.constraint.operator().is_some() {
                write!(f, " {}", dep.constraint)?;
            }
        }
        write!(f, ")")
    }
}

/// Outcome of a resolution run.
#[derive(Debug, Clone)]
pub struct Closure<P: Package, V: Version> {
    packages: FxIndexMap<P, Option<V>>,
    baseline: FxIndexMap<P, V>,
    include_baseline: bool,
    bad_targets: Vec<P>,
    unresolved_groups: Vec<OrGroup<P, V>>,
    banned: FxIndexSet<P>,
    provides: ProvideIndex<P>,
}

impl<P: Package, V: Version> Closure<P, V> {
    /// The result set in insertion order, with the chosen version
    /// when one was picked against a constraint.
    pub fn packages(&self) -> &FxIndexMap<P, Option<V>> {
        &self.packages
    }

    /// Packages with required or important priority.
    pub fn baseline(&self) -> &FxIndexMap<P, V> {
        &self.baseline
    }

    /// Whether [names](Closure::names) includes the baseline.
    pub fn includes_baseline(&self) -> bool {
        self.include_baseline
    }

    /// Targets that do not exist, or are virtual with no provider.
    pub fn bad_targets(&self) -> &[P] {
        &self.bad_targets
    }

    /// OR-groups with no alternative present at the end of the run.
    pub fn unresolved_groups(&self) -> &[OrGroup<P, V>] {
        &self.unresolved_groups
    }

    /// Names banned by the caller, then by the run.
    pub fn banned(&self) -> &FxIndexSet<P> {
        &self.banned
    }

    /// The provide index of the database.
    pub fn provides(&self) -> &ProvideIndex<P> {
        &self.provides
    }

    /// Result set names, followed by the baseline names not already listed
    /// when the baseline is included.
    pub fn names(&self) -> impl Iterator<Item = &P> {
        let baseline = self
            .baseline
            .keys()
            .filter(move |name| self.include_baseline && !self.packages.contains_key(*name));
        self.packages.keys().chain(baseline)
    }

    /// Number of [names](Closure::names).
    ///
    /// A baseline package that is also in the result set counts once,
    /// so this may be less than the result set size plus the baseline size.
    pub fn total(&self) -> usize {
        self.names().count()
    }

    /// No bad target and no unresolved group.
    pub fn is_complete(&self) -> bool {
        self.bad_targets.is_empty() && self.unresolved_groups.is_empty()
    }
}

/// Main function of the library.
/// Computes the set of packages needed to install the requested targets.
pub fn resolve<P: Package, V: Version>(
    provider: &impl MetadataProvider<P, V>,
    request: &Request<P>,
) -> Result<Closure<P, V>, ClosureError<P, V>> {
    let cache = MetadataCache::build(provider)?;
    let mut ctx = Context::new(provider, cache, request.banned().iter().cloned());

    let (targets, include_baseline) = if request.compute_baseline {
        log::info!("Adding bootstrap packages...");
        (ctx.cache.baseline.keys().cloned().collect(), false)
    } else {
        (request.targets().to_vec(), request.include_baseline)
    };

    let mut bad_targets = Vec::new();
    for target in targets {
        let package = match ctx.lookup(&target)? {
            Ok(package) => package,
            Err(err) => {
                log::warn!("Bad input: {}", err);
                if !bad_targets.contains(&target) {
                    bad_targets.push(target);
                }
                continue;
            }
        };
        if ctx.packages.contains_key(&package) {
            log::debug!("{} already included", package);
            continue;
        }
        let version = ctx.best_version(&package)?;
        ctx.insert(package.clone(), None, 0);
        ctx.build(package, version, 1)?;
    }

    ctx.solve_multiples()?;

    let unresolved_groups = ctx
        .unresolved
        .iter()
        .map(|id| &ctx.groups[*id])
        .filter(|group| !group.alternatives.iter().any(|d| ctx.is_present(&d.package)))
        .cloned()
        .collect();

    Ok(Closure {
        packages: ctx.packages,
        baseline: ctx.cache.baseline,
        include_baseline,
        bad_targets,
        unresolved_groups,
        banned: ctx.banned,
        provides: ctx.cache.provides,
    })
}

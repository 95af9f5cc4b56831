// SPDX-License-Identifier: MPL-2.0

//! Depth-first expansion of dependency lists into the result set.
//!
//! Single-choice records are followed immediately.
//! OR-groups are never decided here: the whole chain is stored
//! and queued for the multiple-choice resolver.
//! Recursion is unfolded on an explicit stack of frames so that long
//! dependency chains do not grow the call stack.

use crate::error::ClosureError;
use crate::metadata::{Dependency, MetadataProvider};
use crate::package::Package;
use crate::solver::OrGroup;
use crate::version::Version;

use super::context::Context;

/// What the next record of a dependency list asks for.
enum Step<P, V> {
    Single(Dependency<P, V>),
    Group(OrGroup<P, V>),
}

/// A package version whose dependency list is being walked.
struct Frame<P, V> {
    package: P,
    version: V,
    depth: usize,
    dependencies: Vec<Dependency<P, V>>,
    cursor: usize,
}

impl<P: Package, V: Version> Frame<P, V> {
    /// Advance past the next relevant record.
    /// An OR-chain is consumed whole, terminator included.
    fn next_step(&mut self) -> Option<Step<P, V>> {
        while let Some(dep) = self.dependencies.get(self.cursor) {
            let start = self.cursor;
            self.cursor += 1;
            if !dep.kind.is_resolvable() {
                continue;
            }
            if !dep.or_next {
                return Some(Step::Single(dep.clone()));
            }
            while self
                .dependencies
                .get(self.cursor - 1)
                .is_some_and(|d| d.or_next)
            {
                self.cursor += 1;
            }
            let end = self.cursor.min(self.dependencies.len());
            self.cursor = end;
            return Some(Step::Group(OrGroup {
                owner: self.package.clone(),
                version: self.version.clone(),
                alternatives: self.dependencies[start..end].to_vec(),
            }));
        }
        None
    }
}

impl<'p, P: Package, V: Version, DP: MetadataProvider<P, V>> Context<'p, P, V, DP> {
    /// Expand the dependencies of `package` at `version` into the result set.
    ///
    /// `depth` only drives log indentation.
    /// Termination relies on the result set: a package is walked
    /// at most once per insertion, and insertions never repeat.
    pub fn build(&mut self, package: P, version: V, depth: usize) -> Result<(), ClosureError<P, V>> {
        let mut stack = vec![self.frame(package, version, depth)?];
        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth;
            match frame.next_step() {
                None => {
                    stack.pop();
                }
                Some(Step::Group(group)) => {
                    let id = self.groups.alloc(group);
                    self.pending.push(id);
                }
                Some(Step::Single(dep)) => {
                    if let Some((package, version)) = self.visit(&dep, depth)? {
                        stack.push(self.frame(package, version, depth + 1)?);
                    }
                }
            }
        }
        Ok(())
    }

    fn frame(&self, package: P, version: V, depth: usize) -> Result<Frame<P, V>, ClosureError<P, V>> {
        let dependencies = self.dependencies(&package, &version)?;
        Ok(Frame {
            package,
            version,
            depth,
            dependencies,
            cursor: 0,
        })
    }

    /// Handle a single-choice record.
    /// Returns the package version to descend into, if one was added.
    fn visit(
        &mut self,
        dep: &Dependency<P, V>,
        depth: usize,
    ) -> Result<Option<(P, V)>, ClosureError<P, V>> {
        let target = &dep.package;
        if self.packages.contains_key(target) {
            return Ok(None);
        }

        match self.versions(target)? {
            Some(versions) if !versions.is_empty() => {
                // First satisfying version wins, even when the baseline
                // already covers the package.
                for version in versions {
                    if self.provider.satisfies(target, &version, &dep.constraint) {
                        if self.cache.baseline.contains_key(target) {
                            return Ok(None);
                        }
                        self.insert(target.clone(), Some(version.clone()), depth);
                        return Ok(Some((target.clone(), version)));
                    }
                }
                log::warn!("No version of {} satisfies {}", target, dep.constraint);
                Ok(None)
            }
            _ => match self.resolve_provide(target) {
                Ok(provider) => {
                    log::debug!("{} is a virtual package, using {}", target, provider);
                    if self.is_present(&provider) {
                        return Ok(None);
                    }
                    let version = self.best_version(&provider)?;
                    self.insert(provider.clone(), None, depth);
                    Ok(Some((provider, version)))
                }
                Err(err) => {
                    log::warn!("{}, {} has been banned", err, target);
                    self.banned.insert(target.clone());
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::metadata::{DependencyKind, OfflineMetadataProvider, PackageVersion, Priority};
    use crate::provides::MetadataCache;

    type Db = OfflineMetadataProvider<&'static str, u32>;

    fn run(db: &Db, root: &'static str) -> (Vec<&'static str>, usize, Vec<&'static str>) {
        let cache = MetadataCache::build(db).unwrap();
        let mut ctx = Context::new(db, cache, []);
        let version = ctx.best_version(&root).unwrap();
        ctx.insert(root, None, 0);
        ctx.build(root, version, 1).unwrap();
        (
            ctx.packages.keys().copied().collect(),
            ctx.pending.len(),
            ctx.banned.iter().copied().collect(),
        )
    }

    #[test]
    fn depth_first_order() {
        let mut db = Db::new();
        db.add_version(
            "a",
            PackageVersion::new(1u32).depends([Dependency::depends("b"), Dependency::depends("d")]),
        );
        db.add_version("b", PackageVersion::new(1u32).depends([Dependency::depends("c")]));
        db.add_version("c", PackageVersion::new(1u32));
        db.add_version("d", PackageVersion::new(1u32));

        let (packages, pending, _) = run(&db, "a");
        assert_eq!(packages, ["a", "b", "c", "d"]);
        assert_eq!(pending, 0);
    }

    #[test]
    fn cycles_terminate() {
        let mut db = Db::new();
        db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("b")]));
        db.add_version("b", PackageVersion::new(1u32).depends([Dependency::depends("a")]));

        let (packages, _, _) = run(&db, "a");
        assert_eq!(packages, ["a", "b"]);
    }

    #[test]
    fn irrelevant_kinds_are_skipped() {
        let mut db = Db::new();
        db.add_version(
            "a",
            PackageVersion::new(1u32).depends([
                Dependency::new("s", DependencyKind::Suggests),
                Dependency::new("k", DependencyKind::Conflicts),
                Dependency::pre_depends("p"),
                Dependency::recommends("r"),
            ]),
        );
        for name in ["s", "k", "p", "r"] {
            db.add_version(name, PackageVersion::new(1u32));
        }

        let (packages, _, _) = run(&db, "a");
        assert_eq!(packages, ["a", "p", "r"]);
    }

    #[test]
    fn or_chains_are_deferred_whole() {
        let mut db = Db::new();
        db.add_version(
            "a",
            PackageVersion::new(1u32).depends([
                Dependency::depends("x").or(),
                Dependency::depends("y").or(),
                Dependency::depends("z"),
                Dependency::depends("w"),
            ]),
        );
        for name in ["x", "y", "z", "w"] {
            db.add_version(name, PackageVersion::new(1u32));
        }

        let cache = MetadataCache::build(&db).unwrap();
        let mut ctx = Context::new(&db, cache, []);
        ctx.insert("a", None, 0);
        ctx.build("a", 1, 1).unwrap();

        assert_eq!(ctx.packages.keys().copied().collect::<Vec<_>>(), ["a", "w"]);
        assert_eq!(ctx.pending.len(), 1);
        let group = &ctx.groups[ctx.pending[0]];
        assert_eq!(group.to_string(), "(x | y | z)");
        assert_eq!(group.owner, "a");
    }

    #[test]
    fn first_satisfying_version_is_recorded() {
        let mut db = Db::new();
        db.add_version(
            "a",
            PackageVersion::new(1u32)
                .depends([Dependency::depends("b").with_constraint(Constraint::StrictlyLower(3))]),
        );
        db.add_version("b", PackageVersion::new(5u32));
        db.add_version("b", PackageVersion::new(2u32));
        db.add_version("b", PackageVersion::new(1u32));

        let cache = MetadataCache::build(&db).unwrap();
        let mut ctx = Context::new(&db, cache, []);
        ctx.insert("a", None, 0);
        ctx.build("a", 1, 1).unwrap();
        assert_eq!(ctx.packages.get(&"b"), Some(&Some(2)));
    }

    #[test]
    fn baseline_stops_the_scan() {
        let mut db = Db::new();
        db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("libc")]));
        db.add_version(
            "libc",
            PackageVersion::new(2u32)
                .priority(Priority::Required)
                .depends([Dependency::depends("never")]),
        );
        db.add_version("never", PackageVersion::new(1u32));

        let (packages, _, _) = run(&db, "a");
        assert_eq!(packages, ["a"]);
    }

    #[test]
    fn unresolvable_virtual_is_banned() {
        let mut db = Db::new();
        db.add_version(
            "a",
            PackageVersion::new(1u32).depends([Dependency::depends("ghost"), Dependency::depends("b")]),
        );
        db.add_version("b", PackageVersion::new(1u32));

        let (packages, _, banned) = run(&db, "a");
        assert_eq!(packages, ["a", "b"]);
        assert_eq!(banned, ["ghost"]);
    }

    #[test]
    fn virtual_dependency_pulls_provider() {
        let mut db = Db::new();
        db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("awk")]));
        db.add_version(
            "mawk",
            PackageVersion::new(1u32)
                .provides(["awk"])
                .depends([Dependency::depends("libc")]),
        );
        db.add_version("gawk", PackageVersion::new(1u32).provides(["awk"]));
        db.add_version("libc", PackageVersion::new(1u32));

        let (packages, _, _) = run(&db, "a");
        assert_eq!(packages, ["a", "mawk", "libc"]);
    }
}

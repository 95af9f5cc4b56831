// SPDX-License-Identifier: MPL-2.0

//! Multiple-choice resolution.
//!
//! OR-groups deferred by the closure builder are decided in rounds.
//! A round drops every group already satisfied, stages one alternative
//! for each remaining group, then adds the staged packages and expands
//! them, which may defer new groups. A staged virtual name that cannot
//! be resolved is banned and its groups go back to the queue, to be
//! retried without it. Rounds stop once nothing gets staged.
//!
//! Every round either grows the result set, grows the banned set,
//! or empties the queue, and both sets are bounded by the finite
//! package universe.

use crate::error::ClosureError;
use crate::internal::arena::Id;
use crate::metadata::MetadataProvider;
use crate::package::Package;
use crate::solver::OrGroup;
use crate::type_aliases::FxIndexMap;
use crate::version::Version;

use super::context::Context;

type Staged<P, V> = FxIndexMap<P, Vec<Id<OrGroup<P, V>>>>;

impl<'p, P: Package, V: Version, DP: MetadataProvider<P, V>> Context<'p, P, V, DP> {
    /// Run rounds until one stages nothing.
    pub fn solve_multiples(&mut self) -> Result<(), ClosureError<P, V>> {
        let mut round = 0;
        loop {
            round += 1;
            let staged = self.stage_round(round);
            if staged.is_empty() {
                break;
            }
            self.apply_staged(staged)?;
        }
        log::debug!(
            "{} OR-groups met in {} rounds, {} left unresolved",
            self.groups.len(),
            round,
            self.unresolved.len()
        );
        Ok(())
    }

    /// Pick one alternative for every pending group not already satisfied.
    ///
    /// Staged choices are keyed by name: a group whose first allowed
    /// alternative is already staged by another group rides along with it.
    fn stage_round(&mut self, round: usize) -> Staged<P, V> {
        let pending = std::mem::take(&mut self.pending);
        log::info!("Multiple choices, round {}: {} groups", round, pending.len());
        for id in &pending {
            log::debug!("* {}", self.groups[*id]);
        }

        let mut staged: Staged<P, V> = FxIndexMap::default();
        for id in pending {
            let group = &self.groups[id];
            if let Some(dep) = group.alternatives.iter().find(|d| self.is_present(&d.package)) {
                if self.packages.contains_key(&dep.package) {
                    log::debug!("Using {} already included", dep.package);
                } else {
                    log::debug!("Using {} from bootstrap", dep.package);
                }
                continue;
            }

            let mut choice = None;
            for dep in &group.alternatives {
                if self.banned.contains(&dep.package) {
                    log::debug!("Avoiding {}", dep.package);
                } else {
                    choice = Some(dep.package.clone());
                    break;
                }
            }
            match choice {
                Some(name) => {
                    if !staged.contains_key(&name) {
                        log::debug!("Adding {}", name);
                    }
                    staged.entry(name).or_default().push(id);
                }
                None => {
                    log::warn!("Every alternative of {} is banned", group);
                    self.unresolved.push(id);
                }
            }
        }
        staged
    }

    /// Add the staged choices to the result set and expand them.
    fn apply_staged(&mut self, staged: Staged<P, V>) -> Result<(), ClosureError<P, V>> {
        for (name, riders) in staged {
            log::info!("Recomputing: {}", name);
            let versions = self.versions(&name)?.unwrap_or_default();
            if let Some(version) = versions.into_iter().next() {
                // Concrete choices are taken as is, their constraint is not checked again.
                if !self.packages.contains_key(&name) {
                    self.insert(name.clone(), None, 0);
                    self.build(name, version, 0)?;
                }
                continue;
            }

            match self.resolve_provide(&name) {
                Ok(provider) => {
                    log::debug!("{} is a virtual package, using {}", name, provider);
                    if !self.is_present(&provider) {
                        let version = self.best_version(&provider)?;
                        self.insert(provider.clone(), None, 0);
                        self.build(provider, version, 0)?;
                    }
                }
                Err(err) => {
                    log::warn!("{}, {} has been banned", err, name);
                    self.banned.insert(name);
                    self.pending.extend(riders);
                }
            }
        }
        Ok(())
    }
}
